use sds_core::error::SdsError;
use sds_core::mode::Mode;

pub fn run() -> Result<(), SdsError> {
    println!("Supported template modes:");
    for mode in Mode::ALL {
        let language = if mode.is_english() { "English" } else { "Korean" };
        println!("  {:<8} {language}", mode.cli_name());
    }
    Ok(())
}
