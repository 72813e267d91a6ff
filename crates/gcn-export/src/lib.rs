mod xlsx;

pub use xlsx::{export_report, write_xlsx, SpreadsheetExport, EXPORT_FILE_NAME, EXPORT_MIME_TYPE};
