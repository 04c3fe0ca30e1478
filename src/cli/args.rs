use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config YAML file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging for internal details
    #[arg(short, long)]
    pub debug: bool,

    /// Logger name, overrides the config file
    #[arg(long)]
    pub name: Option<String>,

    /// Also write to a daily rotating file under ~/logs/<name>/
    #[arg(long)]
    pub to_file: bool,

    /// `-lvl/--level` and the options declared under `args` in the config file
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub rest: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_keeps_level_option() {
        let cli =
            Cli::try_parse_from(["easylogger", "--debug", "-lvl", "ERROR", "-t", "x"]).unwrap();
        assert!(cli.debug);
        assert_eq!(cli.rest, vec!["-lvl", "ERROR", "-t", "x"]);
    }

    #[test]
    fn test_config_and_name() {
        let cli = Cli::try_parse_from([
            "easylogger",
            "--config",
            "log.yaml",
            "--name",
            "svc",
            "--to-file",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("log.yaml")));
        assert_eq!(cli.name.as_deref(), Some("svc"));
        assert!(cli.to_file);
        assert!(cli.rest.is_empty());
    }
}
