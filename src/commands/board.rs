//! Item command handlers.
//!
//! Each command loads the board through a [`Controller`], performs one
//! action and prints the result.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use lostboard::services::ThemePreference;
use lostboard::storage::KeyValueStore;
use lostboard::{
    Backend, Controller, DeleteOutcome, DraftForm, ImageEncoder, ItemId, LostboardConfig, Notice,
    NoticeLevel,
};

use super::CmdResult;

/// Values for `lostboard report`.
#[derive(Debug, Clone)]
pub struct ReportArgs {
    /// Item name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Where it was lost or found.
    pub location: String,
    /// `lost` or `found`.
    pub status: String,
    /// Contact details.
    pub contact: String,
    /// Optional photo.
    pub image: Option<PathBuf>,
}

impl From<ReportArgs> for DraftForm {
    fn from(args: ReportArgs) -> Self {
        Self {
            name: args.name,
            description: args.description,
            location: args.location,
            status: args.status,
            contact: args.contact,
            image: args.image,
        }
    }
}

fn build_controller(config: &LostboardConfig) -> lostboard::Result<Controller<Backend>> {
    let backend = Backend::from_config(config)?;
    Ok(Controller::new(backend).with_encoder(ImageEncoder::with_limit(config.max_image_bytes)))
}

fn print_notice(notice: Option<Notice>) {
    match notice {
        Some(Notice {
            level: NoticeLevel::Info,
            message,
        }) => println!("{message}"),
        Some(Notice {
            level: NoticeLevel::Error,
            message,
        }) => eprintln!("{message}"),
        None => {},
    }
}

/// Prints the gallery, or writes it as an HTML page when `html` is set.
async fn emit(
    controller: &Controller<Backend>,
    config: &LostboardConfig,
    html: Option<&Path>,
) -> CmdResult {
    match html {
        Some(path) => {
            let theme = ThemePreference::new(KeyValueStore::open(&config.data_dir)?)
                .get()
                .await?;
            std::fs::write(path, controller.gallery().to_page(theme))?;
            println!(
                "Wrote {} item(s) to {}",
                controller.gallery().card_count(),
                path.display()
            );
        },
        None => print!("{}", controller.gallery().to_text()),
    }
    Ok(())
}

/// List command.
pub async fn cmd_list(config: &LostboardConfig, html: Option<PathBuf>) -> CmdResult {
    let mut controller = build_controller(config)?;
    let loaded = controller.load().await;
    emit(&controller, config, html.as_deref()).await?;
    loaded?;
    Ok(())
}

/// Search command.
pub async fn cmd_search(config: &LostboardConfig, term: &str, html: Option<PathBuf>) -> CmdResult {
    let mut controller = build_controller(config)?;
    controller.load().await?;
    controller.search(term);
    emit(&controller, config, html.as_deref()).await
}

/// Report command.
pub async fn cmd_report(config: &LostboardConfig, args: ReportArgs) -> CmdResult {
    let mut controller = build_controller(config)?;
    controller.load().await?;

    controller.open_report();
    controller.fill(args.into());
    let result = controller.submit().await;
    if let Some((field, message)) = controller.surface().field_error() {
        eprintln!("--{}: {message}", field.as_str());
    }
    print_notice(controller.take_notice());

    let item = result?;
    if !item.id.as_str().is_empty() {
        println!("  ID: {}", item.id);
    }
    Ok(())
}

/// Delete command.
pub async fn cmd_delete(config: &LostboardConfig, id: &str, yes: bool) -> CmdResult {
    let mut controller = build_controller(config)?;
    controller.load().await?;

    let id = ItemId::new(id.trim());
    let result = controller
        .delete(&id, |prompt| yes || confirm_on_stdin(prompt))
        .await;
    print_notice(controller.take_notice());

    if result? == DeleteOutcome::Cancelled {
        println!("Cancelled.");
    }
    Ok(())
}

/// Asks `prompt` on stdout and reads a yes/no answer from stdin.
fn confirm_on_stdin(prompt: &str) -> bool {
    print!("{prompt} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
