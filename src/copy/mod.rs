use std::fmt;

pub mod commands;
pub mod items;

#[derive(Debug)]
pub struct CopyError;
impl fmt::Display for CopyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Copy error")
    }
}
impl std::error::Error for CopyError {}

pub type CopyResult<T> = error_stack::Result<T, CopyError>;

/// ANSI full reset, the same escape the interactive flow uses between
/// screens.
pub fn clear_screen() {
    print!("\x1bc");
}

pub fn banner(text: &str) {
    let width = text.len() + 12;
    println!("{}", "#".repeat(width));
    println!("#     {}     #", text);
    println!("{}", "#".repeat(width));
    println!();
}
