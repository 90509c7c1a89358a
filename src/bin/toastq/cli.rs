use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use humantime::parse_duration;
use toastq::Position;

#[derive(Parser, Debug)]
#[command(author, version, about = "Feed toasts through a queue and log what a renderer would draw", long_about = None)]
pub struct Cli {
    /// Chemin du fichier de configuration TOML.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Ancrage de la pile (ex. "top-right").
    #[arg(long, value_name = "ANCHOR")]
    pub position: Option<Position>,

    /// Nombre maximal de toasts affichés.
    #[arg(long, value_name = "N")]
    pub max_visible: Option<NonZeroUsize>,

    /// Délai avant fermeture automatique (ex. "3s"); "0s" garde les toasts jusqu'à l'interruption.
    #[arg(long, value_parser = parse_duration)]
    pub duration: Option<Duration>,

    /// Délai entre deux toasts.
    #[arg(long, value_parser = parse_duration, default_value = "500ms")]
    pub interval: Duration,

    /// Hover the toast at this index for a second right after it shows.
    #[arg(long, value_name = "INDEX")]
    pub hover: Option<usize>,

    /// Utilise un layer JSON pour les logs (`--features json-logs`).
    #[arg(long, action = ArgAction::SetTrue)]
    pub json_logs: bool,

    /// Filtre de logs explicite (ex. "toastq=debug").
    #[arg(long, value_name = "FILTER")]
    pub log_filter: Option<String>,

    /// Messages to show, in order.
    #[arg(required = true, value_name = "MESSAGE")]
    pub messages: Vec<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
