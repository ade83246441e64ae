//! Interactive shell around the classification workflows.
//!
//! Line-oriented stand-in for the original page navigation: `goto` switches
//! surface (invoking the target's on_enter hook), the remaining commands map
//! one-to-one onto flow operations. Alerts print as `! ...` lines.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;

use exoscout::backend::{BackendKind, ClassifierBackend};
use exoscout::batch_flow::{BatchWorkflow, Route};
use exoscout::config::Config;
use exoscout::dashboard::Dashboard;
use exoscout::dialog::MODEL_CATALOG;
use exoscout::domain::ModelType;
use exoscout::logging::{json_log, obj, v_str, Domain};
use exoscout::predict_flow::{PredictFlow, FEATURE_FIELDS};
use exoscout::progress::{CancelToken, TokioSleeper};
use exoscout::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Home,
    Researcher,
    Dashboard,
}

impl Page {
    fn name(&self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::Researcher => "researcher",
            Page::Dashboard => "dashboard",
        }
    }
}

struct Shell {
    page: Page,
    session: Arc<SessionStore>,
    predict: PredictFlow,
    batch: BatchWorkflow,
    dashboard: Dashboard,
    rng: StdRng,
}

impl Shell {
    fn new() -> Result<Self> {
        let cfg = Config::from_env();
        let backend: Arc<dyn ClassifierBackend> = BackendKind::from_env().build(&cfg)?.into();
        let session = Arc::new(SessionStore::new());
        json_log(
            Domain::System,
            "startup",
            obj(&[("api_base", v_str(&cfg.api_base))]),
        );
        Ok(Self {
            page: Page::Home,
            predict: PredictFlow::new(Arc::clone(&backend)),
            batch: BatchWorkflow::new(Arc::clone(&session), backend),
            dashboard: Dashboard::new(Arc::clone(&session)),
            session,
            rng: StdRng::from_entropy(),
        })
    }

    fn goto(&mut self, page: Page) {
        self.page = page;
        match page {
            Page::Researcher => self.batch.on_enter(),
            Page::Dashboard => self.dashboard.on_enter(),
            Page::Home => {}
        }
        println!("-- {} --", page.name());
    }

    fn open_dialog(&mut self) {
        for entry in &MODEL_CATALOG {
            println!("  {:<20} {} — {}", entry.model.as_str(), entry.name, entry.description);
        }
        match self.page {
            Page::Home => self.predict.dialog.open(),
            _ => self.batch.dialog.open(),
        }
    }

    fn choose(&mut self, id: &str) {
        let Some(model) = ModelType::from_id(id) else {
            println!("! unknown model: {}", id);
            return;
        };
        match self.page {
            Page::Home => self.predict.dialog.choose(model),
            _ => self.batch.dialog.choose(model),
        }
    }

    async fn confirm(&mut self) {
        match self.page {
            Page::Home => {
                let Some(model) = self.predict.dialog.confirm() else {
                    println!("! choose a model first");
                    return;
                };
                match self.predict.submit(model).await {
                    Ok(result) => {
                        println!(
                            "prediction: {:?} ({}% confidence, {} / {})",
                            result.prediction,
                            (result.confidence * 100.0).round(),
                            result.model_type,
                            result.training_mode
                        );
                    }
                    Err(e) => println!("! {}", e),
                }
            }
            _ => {
                if let Some(model) = self.batch.dialog.confirm() {
                    self.batch.select_model(model);
                    println!("model: {}", model);
                } else {
                    println!("! choose a model first");
                }
            }
        }
    }

    async fn predict(&mut self) {
        match self.page {
            Page::Home => println!("! on the home page, use `confirm` after choosing a model"),
            _ => match self.batch.predict().await {
                Ok(rows) => {
                    println!("{} rows predicted", rows);
                    for r in self.batch.results() {
                        println!("  {:<12} {:<13} {}%", r.star_id, r.prediction, r.confidence);
                    }
                }
                Err(e) => println!("! {}", e),
            },
        }
    }

    async fn train(&mut self) {
        match self.batch.train().await {
            Ok(()) => println!("{}", self.batch.training_status()),
            Err(e) => println!("! {}", e),
        }
        if let Some(Route::Dashboard) = self.batch.take_navigation() {
            self.goto(Page::Dashboard);
        }
    }

    async fn apply(&mut self) {
        let applied = self
            .dashboard
            .apply_changes(&TokioSleeper, &CancelToken::new(), &mut self.rng)
            .await;
        if let Some(m) = applied {
            println!(
                "accuracy {:.1}  precision {:.1}  recall {:.1}  f1 {:.1}",
                m.accuracy.value, m.precision.value, m.recall.value, m.f1_score.value
            );
        }
    }

    fn show(&self) {
        println!("page: {}", self.page.name());
        match self.session.selected_model() {
            Some(m) => println!("model: {} ({})", m.model_type, m.training_mode.as_str()),
            None => println!("model: none"),
        }
        match self.session.staged_file() {
            Some(f) => println!("file: {}", f.name),
            None => println!("file: none"),
        }
        if let Some(m) = self.session.metrics() {
            println!(
                "metrics: accuracy {:.1}  precision {:.1}  recall {:.1}  f1 {:.1}",
                m.accuracy.value, m.precision.value, m.recall.value, m.f1_score.value
            );
        }
        if self.page == Page::Dashboard {
            println!(
                "regularization {:.2}  max_iterations {:.0}  history points {}",
                self.dashboard.regularization_strength(),
                self.dashboard.max_iterations(),
                self.dashboard.history().len()
            );
        }
    }

    async fn dispatch(&mut self, line: &str) -> bool {
        let mut parts = line.split_whitespace();
        let Some(cmd) = parts.next() else {
            return true;
        };
        let arg = parts.next();
        match (cmd, arg) {
            ("quit", _) | ("exit", _) => return false,
            ("help", _) => print_help(),
            ("goto", Some("home")) => self.goto(Page::Home),
            ("goto", Some("researcher")) => self.goto(Page::Researcher),
            ("goto", Some("dashboard")) => self.goto(Page::Dashboard),
            ("goto", _) => println!("! goto home|researcher|dashboard"),
            ("model", _) => self.open_dialog(),
            ("choose", Some(id)) => self.choose(id),
            ("confirm", _) => self.confirm().await,
            ("cancel", _) => match self.page {
                Page::Home => self.predict.dialog.cancel(),
                _ => self.batch.dialog.cancel(),
            },
            ("upload", Some(path)) => {
                if let Err(e) = self.batch.upload_file(Path::new(path)) {
                    println!("! {}", e);
                }
            }
            ("upload", None) => println!("! upload <path.csv>"),
            ("set", Some(field)) => {
                let value = parts.next().unwrap_or("");
                if let Err(e) = self.predict.features.set_field(field, value) {
                    println!("! {} (fields: {})", e, FEATURE_FIELDS.join(", "));
                }
            }
            ("predict", _) => self.predict().await,
            ("train", _) => self.train().await,
            ("export", Some(path)) => {
                if let Err(e) = self.batch.export_results(Path::new(path)) {
                    println!("! {}", e);
                }
            }
            ("export", None) => println!("! export <path.csv>"),
            ("reg", Some(v)) => {
                if !self.dashboard.set_regularization_text(v) {
                    println!("! regularization must be a number in [0, 1]");
                }
            }
            ("iters", Some(v)) => {
                if !self.dashboard.set_max_iterations_text(v) {
                    println!("! max iterations must be a number in [0, 1000]");
                }
            }
            ("apply", _) => self.apply().await,
            ("reset", _) => self.dashboard.reset_to_default(),
            ("show", _) => self.show(),
            _ => println!("! unknown command, try `help`"),
        }
        true
    }
}

fn print_help() {
    println!(
        "\
goto home|researcher|dashboard   switch page (runs the page's enter hook)
model / choose <id> / confirm    open catalog, pick a model, confirm
cancel                           dismiss the model dialog
set <field> <value>              set a single-record feature (home page)
upload <path.csv>                stage a file for the batch workflow
predict                          run batch prediction
train                            train on the staged file
export <path.csv>                save batch results
reg <v> / iters <v> / apply      dashboard controls and simulated retraining
reset                            dashboard parameters back to zero
show                             current session state
quit"
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut shell = Shell::new()?;
    let stdin = io::stdin();
    print!("> ");
    io::stdout().flush()?;
    for line in stdin.lock().lines() {
        let line = line?;
        if !shell.dispatch(&line).await {
            break;
        }
        print!("> ");
        io::stdout().flush()?;
    }
    json_log(Domain::System, "shutdown", obj(&[]));
    Ok(())
}
