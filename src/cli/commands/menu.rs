//! Interactive menu.
//!
//! Numbered choices are read as lines; the browser and the "press any key"
//! pauses read single keys. End of input on the line reader ends the menu.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use colored::Colorize;
use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};

use crate::browser::{BrowseOptions, FsLister, KeySource, browse};
use crate::cli::report::{write_banner, write_error_report, write_summary};
use crate::config::AppConfig;
use crate::error::Result;
use crate::sync::{EntityKind, Operation, OperationReport, Request, execute as run_operation};
use crate::validate::XML_EXTENSION;

/// Ticket status choices offered before a ticket export.
const STATUS_CHOICES: [(&str, Option<&str>); 3] = [
    ("All tickets", None),
    ("Only open tickets", Some("Aberto")),
    ("Only finished tickets", Some("Finalizado")),
];

/// Whether the menu should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    /// Input is exhausted.
    Exit,
}

/// Where a document path comes from.
enum Destination {
    Path(String),
    /// The user backed out or picked nothing.
    None,
    Exit,
}

/// Menu session over injected input, output and key source.
pub struct Shell<'a, R, W, K> {
    config: &'a AppConfig,
    input: R,
    out: W,
    keys: K,
    /// Clear the screen between pages.
    clear: bool,
    notice_pause: Duration,
}

impl<'a, R: BufRead, W: Write, K: KeySource> Shell<'a, R, W, K> {
    pub fn new(config: &'a AppConfig, input: R, out: W, keys: K) -> Self {
        Self {
            config,
            input,
            out,
            keys,
            clear: true,
            notice_pause: Duration::from_millis(1500),
        }
    }

    /// Keep the screen and skip pauses (scripted sessions).
    #[must_use]
    pub fn plain(mut self) -> Self {
        self.clear = false;
        self.notice_pause = Duration::ZERO;
        self
    }

    /// Show the main menu until the user exits or input ends.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Interrupted`] on Ctrl-C, or an IO error if
    /// the terminal cannot be used.
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.clear_screen()?;
            write_banner(&mut self.out, "HelpHub - Import and Export")?;
            writeln!(
                self.out,
                "\nConnected record store: {}",
                self.config.db_path.display().to_string().cyan()
            )?;
            writeln!(self.out, "\nChoose an option:")?;
            writeln!(self.out, "  1. Export customers to XML")?;
            writeln!(self.out, "  2. Import customers from XML")?;
            writeln!(self.out, "  3. Export tickets to XML")?;
            writeln!(self.out, "  4. Import tickets from XML")?;
            writeln!(self.out, "  5. Exit")?;

            let Some(choice) = self.prompt("\nEnter the number of the option: ")? else {
                return Ok(());
            };

            let flow = match choice.as_str() {
                "1" => self.export_menu(Operation::ExportCustomers, None)?,
                "2" => self.import_menu(Operation::ImportCustomers)?,
                "3" => self.ticket_export_menu()?,
                "4" => self.import_menu(Operation::ImportTickets)?,
                "5" => {
                    writeln!(self.out, "\nExiting...")?;
                    return Ok(());
                }
                _ => self.invalid_option()?,
            };

            if flow == Flow::Exit {
                return Ok(());
            }
        }
    }

    /// Destination menu for an export; repeats until the export succeeds
    /// or the user goes back.
    fn export_menu(&mut self, operation: Operation, status: Option<&str>) -> Result<Flow> {
        let kind = operation.entity();
        let default = self.config.default_document(kind);

        loop {
            self.clear_screen()?;
            write_banner(&mut self.out, operation.title())?;
            if let Some(status) = status {
                writeln!(self.out, "\nStatus filter: {status}")?;
            }
            writeln!(self.out, "\nChoose where to save the XML file:")?;
            writeln!(self.out, "  1. Use the default path ({})", default.display())?;
            writeln!(self.out, "  2. Browse the file system (interactive)")?;
            writeln!(self.out, "  3. Type the path")?;
            writeln!(self.out, "  4. Back to the main menu")?;

            let Some(choice) = self.prompt("\nEnter the number of the option: ")? else {
                return Ok(Flow::Exit);
            };

            let destination = match choice.as_str() {
                "1" => Destination::Path(default.display().to_string()),
                "2" => self.browse_documents(kind, &format!("Select where to save the {} XML file", kind.label()))?,
                "3" => {
                    writeln!(self.out, "\nEnter the full path of the XML file.")?;
                    writeln!(
                        self.out,
                        "Example: {}",
                        Path::new("backup").join(format!("{}.xml", kind.root_tag())).display()
                    )?;
                    match self.prompt("\nPath: ")? {
                        Some(path) => Destination::Path(path),
                        None => Destination::Exit,
                    }
                }
                "4" => return Ok(Flow::Continue),
                _ => {
                    if self.invalid_option()? == Flow::Exit {
                        return Ok(Flow::Exit);
                    }
                    continue;
                }
            };

            match destination {
                Destination::Path(path) => {
                    let request = Request::new(operation, path).with_status(status.map(str::to_string));
                    if self.run_and_show(&request)?.success {
                        return Ok(Flow::Continue);
                    }
                }
                Destination::None => {}
                Destination::Exit => return Ok(Flow::Exit),
            }
        }
    }

    fn ticket_export_menu(&mut self) -> Result<Flow> {
        loop {
            self.clear_screen()?;
            write_banner(&mut self.out, "Ticket export")?;
            writeln!(self.out, "\nChoose which tickets to export:")?;
            for (i, (label, _)) in STATUS_CHOICES.iter().enumerate() {
                writeln!(self.out, "  {}. {label}", i + 1)?;
            }
            writeln!(self.out, "  {}. Back to the main menu", STATUS_CHOICES.len() + 1)?;

            let Some(choice) = self.prompt("\nEnter the number of the option: ")? else {
                return Ok(Flow::Exit);
            };

            let selected = choice
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1));
            match selected {
                Some(i) if i < STATUS_CHOICES.len() => {
                    return self.export_menu(Operation::ExportTickets, STATUS_CHOICES[i].1);
                }
                Some(i) if i == STATUS_CHOICES.len() => return Ok(Flow::Continue),
                _ => {
                    if self.invalid_option()? == Flow::Exit {
                        return Ok(Flow::Exit);
                    }
                }
            }
        }
    }

    /// Source menu for an import. A missing default falls through to the
    /// browser; a typed path must exist.
    fn import_menu(&mut self, operation: Operation) -> Result<Flow> {
        let kind = operation.entity();
        let default = self.config.default_document(kind);

        self.clear_screen()?;
        write_banner(&mut self.out, operation.title())?;
        writeln!(self.out, "\nChoose the XML file to import:")?;
        writeln!(self.out, "  1. Use the default path ({})", default.display())?;
        writeln!(self.out, "  2. Browse the file system (interactive)")?;
        writeln!(self.out, "  3. Type the path")?;

        let Some(choice) = self.prompt("\nEnter the number of the option: ")? else {
            return Ok(Flow::Exit);
        };

        let title = format!("Select the {} XML file to import", kind.label());
        let source = match choice.as_str() {
            "1" if default.is_file() => Destination::Path(default.display().to_string()),
            "1" => {
                writeln!(
                    self.out,
                    "\nDefault file not found. Opening the file browser..."
                )?;
                self.out.flush()?;
                std::thread::sleep(self.notice_pause);
                self.browse_documents(kind, &title)?
            }
            "2" => self.browse_documents(kind, &title)?,
            "3" => match self.prompt("\nEnter the full path of the XML file: ")? {
                None => Destination::Exit,
                Some(path) if Path::new(&path).exists() => Destination::Path(path),
                Some(path) => {
                    writeln!(self.out, "\n{} {path}", "File not found:".red())?;
                    self.pause()?;
                    Destination::None
                }
            },
            _ => return self.invalid_option(),
        };

        match source {
            Destination::Path(path) => {
                self.run_and_show(&Request::new(operation, path))?;
                Ok(Flow::Continue)
            }
            Destination::None => Ok(Flow::Continue),
            Destination::Exit => Ok(Flow::Exit),
        }
    }

    /// Browse for an `.xml` file, starting in the default export folder
    /// when it exists.
    fn browse_documents(&mut self, kind: EntityKind, title: &str) -> Result<Destination> {
        let folder = self.config.default_document(kind).parent().map(Path::to_path_buf);
        let start = match folder {
            Some(dir) if dir.is_dir() => dir,
            _ => std::env::current_dir()?,
        };

        let options = BrowseOptions {
            clear: self.clear,
            error_pause: self.notice_pause.min(Duration::from_secs(1)),
            ..BrowseOptions::new(title, Some(XML_EXTENSION))
        };
        let selected: Option<PathBuf> =
            browse(&start, &FsLister, &mut self.keys, &mut self.out, &options)?;

        Ok(selected.map_or(Destination::None, |p| Destination::Path(p.display().to_string())))
    }

    /// Run an operation and show its outcome; errors get the full-screen
    /// report.
    fn run_and_show(&mut self, request: &Request) -> Result<OperationReport> {
        let report = run_operation(self.config, request);

        if !report.errors.is_empty() {
            self.clear_screen()?;
            write_error_report(&mut self.out, &report)?;
        }
        write_summary(&mut self.out, &report)?;
        self.pause()?;
        Ok(report)
    }

    fn invalid_option(&mut self) -> Result<Flow> {
        writeln!(self.out, "\n{}", "Invalid option.".red())?;
        self.pause()?;
        Ok(Flow::Continue)
    }

    fn pause(&mut self) -> Result<()> {
        writeln!(self.out, "\nPress any key to continue...")?;
        self.out.flush()?;
        self.keys.wait_any()
    }

    /// Print `label` and read one trimmed line; `None` at end of input.
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.out, "{label}")?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn clear_screen(&mut self) -> Result<()> {
        if self.clear {
            queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        }
        Ok(())
    }
}
