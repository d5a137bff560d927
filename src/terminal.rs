//! Operator console command table.
//!
//! Maps unique, case-sensitive ASCII command names to handlers plus their
//! help text.  Modules register at start and unregister by handler identity
//! at stop, so one handler may back several names.
//!
//! Lookup runs in the critical section; the handler itself runs after the
//! lock is released, on the caller's (console) context.  The table holds an
//! `Arc` to each handler, so a dispatch racing an unregister still runs on
//! live memory, and every dispatch that starts after the unregister sees
//! [`CommandError::UnknownCommand`].
//!
//! Unlike a cleared tick callback, a command looked up just before its
//! unregister may still be running, or about to run, once the unregister
//! returns.  That one in-flight call can therefore reach module logic after
//! the module's `stop()`.  Handlers must tolerate a call after stop;
//! unregister does not wait for them, because a handler may itself stop a
//! module.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use heapless::Vec;
use log::{debug, info, warn};
use std::sync::Arc;

use crate::app::ports::CommandHandler;
use crate::error::CommandError;

/// Capacity of the process-wide command table.
pub const MAX_COMMANDS: usize = 32;
/// Maximum number of whitespace-separated tokens on one console line.
pub const MAX_ARGS: usize = 16;

/// Built-in command that lists the table.  Cannot be registered.
pub const HELP_COMMAND: &str = "help";

/// One registered command.
#[derive(Clone)]
pub struct CommandEntry {
    pub name: &'static str,
    pub help_summary: &'static str,
    pub help_args: &'static str,
    pub handler: Arc<dyn CommandHandler>,
}

impl core::fmt::Debug for CommandEntry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CommandEntry")
            .field("name", &self.name)
            .field("help_summary", &self.help_summary)
            .field("help_args", &self.help_args)
            .finish_non_exhaustive()
    }
}

/// Help metadata for one command, without the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandInfo {
    pub name: &'static str,
    pub help_summary: &'static str,
    pub help_args: &'static str,
}

/// Fixed-capacity, name-keyed command table.
pub struct CommandRegistry {
    table: Mutex<CriticalSectionRawMutex, RefCell<Vec<CommandEntry, MAX_COMMANDS>>>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    pub const fn new() -> Self {
        Self {
            table: Mutex::new(RefCell::new(Vec::new())),
        }
    }

    /// Add `name` to the table.
    ///
    /// Fails with [`CommandError::DuplicateName`] if the name is taken (the
    /// existing entry is kept), [`CommandError::InvalidName`] for an empty,
    /// non-ASCII or whitespace-containing name, and
    /// [`CommandError::TableFull`] when the table is at capacity.
    pub fn register(
        &self,
        name: &'static str,
        help_summary: &'static str,
        help_args: &'static str,
        handler: Arc<dyn CommandHandler>,
    ) -> Result<(), CommandError> {
        if !is_valid_name(name) {
            warn!("terminal: rejected command name {:?}", name);
            return Err(CommandError::InvalidName);
        }
        if name == HELP_COMMAND {
            warn!("terminal: '{}' is built in", name);
            return Err(CommandError::DuplicateName);
        }

        self.table
            .lock(|cell| {
                let mut table = cell.borrow_mut();
                if table.iter().any(|e| e.name == name) {
                    return Err(CommandError::DuplicateName);
                }
                table
                    .push(CommandEntry {
                        name,
                        help_summary,
                        help_args,
                        handler,
                    })
                    .map_err(|_| CommandError::TableFull)
            })
            .inspect_err(|e| warn!("terminal: cannot register '{}': {}", name, e))?;

        debug!("terminal: registered '{}'", name);
        Ok(())
    }

    /// Remove every entry backed by `handler`.  Returns how many were
    /// removed; zero is not an error.
    pub fn unregister_by_handler(&self, handler: &Arc<dyn CommandHandler>) -> usize {
        let removed = self.table.lock(|cell| {
            let mut table = cell.borrow_mut();
            let before = table.len();
            table.retain(|e| !Arc::ptr_eq(&e.handler, handler));
            before - table.len()
        });
        if removed > 0 {
            debug!("terminal: unregistered {} command(s)", removed);
        }
        removed
    }

    /// Run the handler registered under `name` with `argv`.
    ///
    /// `help` is answered by the registry itself.
    pub fn dispatch(&self, name: &str, argv: &[&str]) -> Result<(), CommandError> {
        if name == HELP_COMMAND {
            self.print_help();
            return Ok(());
        }

        let handler = self
            .table
            .lock(|cell| {
                cell.borrow()
                    .iter()
                    .find(|e| e.name == name)
                    .map(|e| Arc::clone(&e.handler))
            })
            .ok_or(CommandError::UnknownCommand)?;

        debug!("terminal: dispatch '{}' ({} args)", name, argv.len());
        handler.run(argv);
        Ok(())
    }

    /// Tokenise one console line and dispatch it.
    pub fn execute_line(&self, line: &str) -> Result<(), CommandError> {
        let mut argv: Vec<&str, MAX_ARGS> = Vec::new();
        for token in line.split_ascii_whitespace() {
            argv.push(token).map_err(|_| CommandError::TooManyArgs)?;
        }
        let name = argv.first().copied().ok_or(CommandError::EmptyLine)?;
        self.dispatch(name, &argv)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table
            .lock(|cell| cell.borrow().iter().any(|e| e.name == name))
    }

    pub fn len(&self) -> usize {
        self.table.lock(|cell| cell.borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Help metadata in registration order.
    pub fn entries(&self) -> Vec<CommandInfo, MAX_COMMANDS> {
        self.table.lock(|cell| {
            cell.borrow()
                .iter()
                .map(|e| CommandInfo {
                    name: e.name,
                    help_summary: e.help_summary,
                    help_args: e.help_args,
                })
                .collect()
        })
    }

    fn print_help(&self) {
        info!("Valid commands:");
        info!("  {}", HELP_COMMAND);
        info!("    Show this help");
        for e in &self.entries() {
            if e.help_args.is_empty() {
                info!("  {}", e.name);
            } else {
                info!("  {} {}", e.name, e.help_args);
            }
            info!("    {}", e.help_summary);
        }
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_graphic())
}
