mod demo;
mod signals;

use crossterm::event;
use lazykube_framework::{AppDesc, Services, start_with_desc};
use lazykube_kubectl::{DEFAULT_PROGRAM, KubectlConfig};
use log::LevelFilter;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    crossterm::{
        event::{DisableMouseCapture, EnableMouseCapture},
        execute,
        style::{Color, ResetColor, SetBackgroundColor},
        terminal::{
            Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
            enable_raw_mode,
        },
    },
};
use std::env;
use std::io;
use std::panic;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

fn print_usage() {
    eprintln!("Usage: lazykube [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --kubeconfig <PATH>     Use this kubeconfig (default: ~/.kube/config)");
    eprintln!("  --context <NAME>        Use this kubeconfig context");
    eprintln!("  --demo                  Browse a built-in sample cluster");
    eprintln!("  --debug, -d             Show the diagnostics panel with debug logging");
    eprintln!("  --log-file <PATH>       Also write diagnostics to a file");
    eprintln!("  --help, -h              Print this help message");
}

fn check_kubectl_available() -> io::Result<()> {
    // try to execute kubectl version --client to check if it's available
    match Command::new(DEFAULT_PROGRAM)
        .args(["version", "--client"])
        .output()
    {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(io::Error::new(
            io::ErrorKind::NotFound,
            "Error: 'kubectl' not found in PATH.\n\
                 \n\
                 lazykube drives kubectl to list resources and follow pod logs.\n\
                 \n\
                 Installation instructions:\n\
                 - macOS: brew install kubectl\n\
                 - Linux: see https://kubernetes.io/docs/tasks/tools/\n\
                 \n\
                 Run with --demo to try lazykube without a cluster.",
        )),
        Err(e) => Err(e),
    }
}

#[derive(Default)]
struct UsageOptions {
    kubeconfig: Option<PathBuf>,
    context: Option<String>,
    demo: bool,
    debug: bool,
    log_file: Option<PathBuf>,
    help: bool,
}

impl UsageOptions {
    fn from_args(args: &[String]) -> Result<Self, io::Error> {
        let mut options = Self::default();
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--kubeconfig" => options.kubeconfig = Some(Self::value(&mut iter, arg)?.into()),
                "--context" => options.context = Some(Self::value(&mut iter, arg)?),
                "--log-file" => options.log_file = Some(Self::value(&mut iter, arg)?.into()),
                "--demo" => options.demo = true,
                "--debug" | "-d" => options.debug = true,
                "--help" | "-h" => options.help = true,
                _ => {
                    print_usage();
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("Unknown option: {}", arg),
                    ));
                }
            }
        }
        Ok(options)
    }

    fn value<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str) -> io::Result<String> {
        iter.next().cloned().ok_or_else(|| {
            print_usage();
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Missing value for {}", flag),
            )
        })
    }

    fn kubectl_config(&self) -> KubectlConfig {
        let mut config = KubectlConfig::new();
        config.kubeconfig = self.kubeconfig.clone().or_else(default_kubeconfig);
        config.context = self.context.clone();
        config
    }

    fn app_desc(&self) -> AppDesc {
        let mut desc = AppDesc::new();
        if self.debug {
            desc.show_diagnostics = true;
            desc.log_level = LevelFilter::Debug;
        }
        desc.log_file = self.log_file.clone();
        desc
    }
}

/// `~/.kube/config`, when it exists; otherwise kubectl's own lookup applies
fn default_kubeconfig() -> Option<PathBuf> {
    if env::var_os("KUBECONFIG").is_some() {
        return None;
    }
    dirs::home_dir()
        .map(|home| home.join(".kube").join("config"))
        .filter(|path| path.is_file())
}

fn main() -> io::Result<()> {
    // Collect args excluding the binary name
    let args: Vec<String> = env::args().skip(1).collect();
    let options = UsageOptions::from_args(&args)?;

    if options.help {
        print_usage();
        return Ok(());
    }

    if !options.demo {
        if let Err(e) = check_kubectl_available() {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }

    let services: Services = if options.demo {
        demo::services()
    } else {
        lazykube_kubectl::services(options.kubectl_config())
    };

    let desc = options.app_desc();
    if let Err(e) = signals::watch_termination(desc.exit_requested.clone()) {
        eprintln!("Warning: cannot install signal handlers: {}", e);
    }

    let mut terminal = setup_terminal()?;

    // Ensure we restore the terminal on panic
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    let app_result = start_with_desc(&mut terminal, services, desc);

    // Always restore terminal before printing or exiting
    restore_terminal()?;

    if let Err(err) = app_result {
        eprintln!("Application Error: {:?}", err);
        std::process::exit(1);
    }

    Ok(())
}

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    // mouse capture delivers clicks on tree lines
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    execute!(
        stdout,
        SetBackgroundColor(Color::Reset),
        Clear(ClearType::All)
    )?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

fn restore_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();

    let _ = execute!(stdout, ResetColor);
    let _ = execute!(stdout, DisableMouseCapture);
    let _ = execute!(stdout, LeaveAlternateScreen);

    // Drain pending events so they don't leak to the shell
    while event::poll(Duration::from_millis(0)).unwrap_or(false) {
        let _ = event::read();
    }

    let _ = disable_raw_mode();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_flags_with_values() {
        let options =
            UsageOptions::from_args(&args(&["--context", "staging", "--debug", "--demo"])).unwrap();
        assert_eq!(options.context.as_deref(), Some("staging"));
        assert!(options.debug);
        assert!(options.demo);
        assert!(!options.help);

        let desc = options.app_desc();
        assert!(desc.show_diagnostics);
        assert_eq!(desc.log_level, LevelFilter::Debug);
    }

    #[test]
    fn test_explicit_kubeconfig_wins() {
        let options = UsageOptions::from_args(&args(&["--kubeconfig", "/tmp/kc"])).unwrap();
        let config = options.kubectl_config();
        assert_eq!(config.kubeconfig, Some(PathBuf::from("/tmp/kc")));
        assert_eq!(config.context, None);
    }

    #[test]
    fn test_rejects_unknown_and_incomplete_flags() {
        assert!(UsageOptions::from_args(&args(&["--nope"])).is_err());
        assert!(UsageOptions::from_args(&args(&["--context"])).is_err());
    }
}
