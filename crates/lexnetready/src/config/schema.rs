use serde::{Deserialize, Serialize};

use crate::index::DEFAULT_INDEX_FOOTER;

pub const CONFIG_VERSION: &str = "1.0";

/// Name of the output directory created inside the batch's source folder.
pub const DEFAULT_OUTPUT_DIRECTORY_NAME: &str = "LEXNET_READY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_output_directory_name")]
    pub output_directory_name: String,
    #[serde(default = "default_true")]
    pub generate_index: bool,
    #[serde(default = "default_index_footer")]
    pub index_footer: String,
    #[serde(default)]
    pub tools: ToolsConfig,
}

fn default_version() -> String {
    CONFIG_VERSION.to_string()
}

fn default_output_directory_name() -> String {
    DEFAULT_OUTPUT_DIRECTORY_NAME.to_string()
}

fn default_true() -> bool {
    true
}

fn default_index_footer() -> String {
    DEFAULT_INDEX_FOOTER.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            output_directory_name: default_output_directory_name(),
            generate_index: true,
            index_footer: default_index_footer(),
            tools: ToolsConfig::default(),
        }
    }
}

/// Locations and options of the external programs the pipeline drives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub converter: ConverterConfig,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub signer: SignerConfig,
    #[serde(default)]
    pub inspector: InspectorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverterConfig {
    #[serde(default = "default_converter_program")]
    pub program: String,
    /// Source extensions (lowercase, without dot) handed to the converter.
    #[serde(default = "default_convertible_extensions")]
    pub extensions: Vec<String>,
}

fn default_converter_program() -> String {
    if cfg!(target_os = "windows") {
        r"C:\Program Files\LibreOffice\program\soffice.exe".to_string()
    } else if cfg!(target_os = "macos") {
        "/Applications/LibreOffice.app/Contents/MacOS/soffice".to_string()
    } else {
        "libreoffice".to_string()
    }
}

fn default_convertible_extensions() -> Vec<String> {
    [
        "doc", "docx", "odt", "rtf", "txt", "wpd", "xls", "xlsx", "ods", "csv", "ppt", "pptx",
        "odp", "jpg", "jpeg", "png", "tif", "tiff", "bmp", "gif",
    ]
    .iter()
    .map(|e| e.to_string())
    .collect()
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            program: default_converter_program(),
            extensions: default_convertible_extensions(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    #[serde(default = "default_ocr_program")]
    pub program: String,
    /// Tesseract language codes; empty leaves the choice to the OCR tool.
    #[serde(default)]
    pub languages: Vec<String>,
}

fn default_ocr_program() -> String {
    "ocrmypdf".to_string()
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            program: default_ocr_program(),
            languages: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignerConfig {
    #[serde(default = "default_java_program")]
    pub java: String,
    #[serde(default = "default_signer_jar")]
    pub jar: String,
    /// Certificate store backend passed to `-store`.
    #[serde(default = "default_signer_store")]
    pub store: String,
    #[serde(default = "default_signature_format")]
    pub format: String,
}

fn default_java_program() -> String {
    "java".to_string()
}

fn default_signer_jar() -> String {
    if cfg!(target_os = "windows") {
        r"C:\Program Files\AutoFirma\AutoFirma.jar".to_string()
    } else if cfg!(target_os = "macos") {
        "/Applications/AutoFirma.app/Contents/Java/AutoFirma.jar".to_string()
    } else {
        "/usr/lib/Autofirma/autofirma.jar".to_string()
    }
}

fn default_signer_store() -> String {
    if cfg!(any(target_os = "windows", target_os = "macos")) {
        "auto".to_string()
    } else {
        "mozilla".to_string()
    }
}

fn default_signature_format() -> String {
    "pades".to_string()
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            java: default_java_program(),
            jar: default_signer_jar(),
            store: default_signer_store(),
            format: default_signature_format(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectorConfig {
    #[serde(default = "default_inspector_program")]
    pub program: String,
}

fn default_inspector_program() -> String {
    if cfg!(target_os = "windows") {
        "pdfsig.exe".to_string()
    } else {
        "pdfsig".to_string()
    }
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            program: default_inspector_program(),
        }
    }
}
