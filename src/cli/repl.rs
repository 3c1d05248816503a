//! # Interactive Shell
//!
//! Rustyline-backed REPL. The prompt shows the current database
//! (`ghostsql[mydb]> `); `exit` and `quit` leave the loop; one statement
//! per line with an optional trailing `;`. Parse and execution errors are
//! printed and the loop continues — only EOF or an exit command ends the
//! session.

use crate::cli::table::TableFormatter;
use crate::sql::{Executor, Parser};
use crate::storage::Database;
use eyre::{Result, WrapErr};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

pub struct Repl<'a> {
    db: &'a Database,
    editor: DefaultEditor,
}

impl<'a> Repl<'a> {
    pub fn new(db: &'a Database) -> Result<Self> {
        let editor = DefaultEditor::new().wrap_err("failed to initialize line editor")?;
        Ok(Self { db, editor })
    }

    pub fn run(&mut self) -> Result<()> {
        println!("GhostSQL Interactive Shell");
        println!("Type 'exit' or 'quit' to exit");
        println!();

        loop {
            let prompt = format!("ghostsql[{}]> ", self.db.current_database());
            match self.editor.readline(&prompt) {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }
                    self.editor.add_history_entry(input).ok();

                    if input == "exit" || input == "quit" {
                        println!("Goodbye!");
                        break;
                    }
                    execute_line(self.db, input);
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                }
                Err(ReadlineError::Eof) => {
                    println!("Goodbye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error reading input: {err}");
                    break;
                }
            }
        }

        Ok(())
    }
}

/// Parses and executes one statement, printing the outcome. Shared by the
/// REPL and the stdin batch mode.
pub fn execute_line(db: &Database, input: &str) {
    let stmt = match Parser::new(input).parse() {
        Ok(stmt) => stmt,
        Err(err) => {
            eprintln!("Parse error: {err}");
            return;
        }
    };

    match Executor::new(db).execute(stmt) {
        Ok(result) => {
            if let Some(message) = &result.message {
                println!("{message}");
            }
            if !result.columns.is_empty() {
                let formatter = TableFormatter::new(&result);
                print!("{}", formatter.render());
                println!("{} row(s)", formatter.row_count());
                println!();
            }
        }
        Err(err) => {
            eprintln!("Execution error: {err}");
        }
    }
}
