use clap::Parser;
use color_eyre::Result;
use ratatui::DefaultTerminal;
use std::path::PathBuf;
use std::sync::mpsc::channel;
use tracksift::{App, AppConfig, AppEvent, LoadOptions};

#[derive(Parser, Debug)]
#[command(version, about = "tracksift")]
struct Args {
    /// CSV files holding the track dataset, concatenated in order
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Number of tracks on the first page of results
    #[arg(long = "page-size")]
    page_size: Option<usize>,

    /// Specify the delimiter to use when reading a file
    #[arg(long = "delimiter")]
    delimiter: Option<u8>,

    /// Specify that the file has no header
    #[arg(long = "no-header")]
    no_header: Option<bool>,

    /// Column holding the embeddable track identifier
    #[arg(long = "id-column")]
    id_column: Option<String>,
}

impl Args {
    /// Build load options from CLI args and config, with CLI args taking precedence
    fn load_options(&self, config: &AppConfig) -> LoadOptions {
        let mut opts = LoadOptions::new();
        opts.delimiter = self.delimiter.or(config.file_loading.delimiter);
        opts.has_header = if let Some(no_header) = self.no_header {
            Some(!no_header)
        } else {
            config.file_loading.has_header
        };
        opts.id_column = Some(
            self.id_column
                .clone()
                .unwrap_or_else(|| config.dataset.id_column.clone()),
        );
        opts
    }
}

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

fn run(mut terminal: DefaultTerminal, args: &Args) -> Result<()> {
    let config = AppConfig::load(tracksift::APP_NAME).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config: {}. Using defaults.", e);
        AppConfig::default()
    });

    let (tx, rx) = channel::<AppEvent>();
    let mut app = App::new_with_config(tx.clone(), config.clone());
    if let Some(page_size) = args.page_size {
        app.set_page_size(page_size);
    }
    render(&mut terminal, &mut app)?;
    tx.send(AppEvent::Open(args.paths.clone(), args.load_options(&config)))?;

    loop {
        if crossterm::event::poll(std::time::Duration::from_millis(25))? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => tx.send(AppEvent::Key(key))?,
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        let updated = match rx.recv_timeout(std::time::Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    AppEvent::Crash(msg) => {
                        return Err(color_eyre::eyre::eyre!(msg));
                    }
                    event => {
                        if let Some(event) = app.event(&event) {
                            tx.send(event)?;
                        }
                    }
                }
                true
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => false,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            render(&mut terminal, &mut app)?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    color_eyre::install()?;
    let terminal = ratatui::init();
    let result = run(terminal, &args);
    ratatui::restore();
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
