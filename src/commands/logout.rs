/// Prints the logout confirmation; token clearing happens in main before
/// this runs.
pub fn execute() {
    println!();
    println!("You've been logged out.");
}
