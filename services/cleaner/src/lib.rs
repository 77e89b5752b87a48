mod cli;
mod commands;
mod report;

use seat_matrix::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
