use std::fmt;

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use sqlx::FromRow;

/// Format used for `upload_date` in every JSON response.
pub const UPLOAD_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Document types accepted by the upload endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Pdf,
    Doc,
    Docx,
}

impl FileType {
    /// Resolves the type from the text after the last `.` in `filename`,
    /// ignoring case. Filenames without a dot have no type.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(FileType::Pdf),
            "doc" => Some(FileType::Doc),
            "docx" => Some(FileType::Docx),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Pdf => "pdf",
            FileType::Doc => "doc",
            FileType::Docx => "docx",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True when `filename` carries one of the accepted extensions.
pub fn allowed_file(filename: &str) -> bool {
    FileType::from_filename(filename).is_some()
}

/// One row of the `resumes` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ResumeRecord {
    pub id: i32,
    pub filename: String,
    pub original_name: String,
    pub file_size: i64,
    pub file_type: String,
    pub candidate_name: String,
    pub position: String,
    pub file_path: String,
    #[serde(serialize_with = "serialize_upload_date")]
    pub upload_date: NaiveDateTime,
}

/// Everything needed to insert a row; the id is assigned by the database.
#[derive(Debug, Clone)]
pub struct NewResume {
    pub filename: String,
    pub original_name: String,
    pub file_size: i64,
    pub file_type: FileType,
    pub candidate_name: String,
    pub position: String,
    pub file_path: String,
    pub upload_date: NaiveDateTime,
}

fn serialize_upload_date<S>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&date.format(UPLOAD_DATE_FORMAT))
}
