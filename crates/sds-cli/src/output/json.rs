use sds_core::error::SdsError;
use sds_core::record::MsdsRecord;

pub fn print(record: &MsdsRecord) -> Result<(), SdsError> {
    println!("{}", serde_json::to_string_pretty(record)?);
    Ok(())
}
