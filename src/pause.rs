use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

/// Keep the terminal open until the user acknowledges a failure.
///
/// Reads one line; Ctrl-C and end-of-input count as acknowledgment so a
/// launcher run with its stdin closed still terminates.
pub fn wait_for_ack() {
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        // No usable terminal, nothing to hold open.
        Err(_) => return,
    };
    match rl.readline("press Enter to close... ") {
        Ok(_) | Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {}
        Err(err) => {
            println!("Error: {:?}", err);
        }
    }
}
