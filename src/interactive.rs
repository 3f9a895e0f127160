//! Line-based prompts for the interactive pipeline.
//!
//! The tool talks to a human on stdin/stdout; everything here is plain
//! blocking IO, called before any download work starts.

use std::io::{self, BufRead, Write};

/// Prints a prompt and reads one trimmed line from stdin.
pub fn prompt_line(prompt: &str) -> io::Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Like [`prompt_line`], but maps empty input to `None`.
pub fn prompt_optional(prompt: &str) -> io::Result<Option<String>> {
    let line = prompt_line(prompt)?;
    Ok(if line.is_empty() { None } else { Some(line) })
}

/// Parses a numbered-menu choice.
///
/// Empty input selects the default (`Ok(None)`). A number in `1..=len` maps
/// to a zero-based index. Anything else is an error message to show the user.
pub fn parse_menu_choice(input: &str, len: usize) -> Result<Option<usize>, String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    match input.parse::<usize>() {
        Ok(n) if (1..=len).contains(&n) => Ok(Some(n - 1)),
        Ok(_) => Err(format!("Please enter a number between 1 and {}", len)),
        Err(_) => Err("Please enter a valid number".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_menu_choice_empty_is_default() {
        assert_eq!(parse_menu_choice("", 3), Ok(None));
        assert_eq!(parse_menu_choice("   ", 3), Ok(None));
    }

    #[test]
    fn test_parse_menu_choice_valid() {
        assert_eq!(parse_menu_choice("1", 3), Ok(Some(0)));
        assert_eq!(parse_menu_choice("3", 3), Ok(Some(2)));
    }

    #[test]
    fn test_parse_menu_choice_out_of_range() {
        assert!(parse_menu_choice("0", 3).is_err());
        assert!(parse_menu_choice("4", 3).is_err());
    }

    #[test]
    fn test_parse_menu_choice_not_a_number() {
        assert!(parse_menu_choice("mp4", 3).is_err());
    }
}
