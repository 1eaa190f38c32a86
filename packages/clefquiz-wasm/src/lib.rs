use serde::Serialize;
use wasm_bindgen::prelude::*;

use clefquiz::bank::{self, BankFormat};
use clefquiz::{
    Clef, ImageResolver, NoteBank, NoteName, QuizError, QuizSession, SessionConfig, UrlResolver,
};

#[derive(Serialize)]
struct ErrorInfo {
    kind: &'static str,
    message: String,
}

#[derive(Serialize)]
struct Diagnostic {
    message: String,
    severity: String,
}

fn error_to_info(e: &QuizError) -> ErrorInfo {
    let kind = match e {
        QuizError::InvalidBank(_) => "invalidBank",
        QuizError::InsufficientChoices { .. } => "insufficientChoices",
        QuizError::InvalidPhase { .. } => "invalidPhase",
        QuizError::LoadError { .. } => "loadError",
        QuizError::InvalidConfig(_) => "invalidConfig",
        QuizError::InvalidLabel(_) => "invalidLabel",
        QuizError::Unauthorized => "unauthorized",
        QuizError::DriverClosed => "driverClosed",
    };
    ErrorInfo {
        kind,
        message: e.to_string(),
    }
}

fn to_js_error(e: QuizError) -> JsValue {
    let info = error_to_info(&e);
    JsValue::from_str(&serde_json::to_string(&info).unwrap_or(info.message))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn parse_config(config_yaml: Option<String>) -> Result<SessionConfig, QuizError> {
    match config_yaml {
        Some(source) => SessionConfig::from_yaml(&source),
        None => Ok(SessionConfig::default()),
    }
}

/// One quiz session, driven by the page's own one-second timer
#[wasm_bindgen]
pub struct QuizGame {
    session: QuizSession,
    resolver: UrlResolver,
}

#[wasm_bindgen]
impl QuizGame {
    /// Start a session on a bank given as JSON, or on the embedded bank when
    /// `bank_json` is absent.
    #[wasm_bindgen(constructor)]
    pub fn new(
        clef: &str,
        config_yaml: Option<String>,
        bank_json: Option<String>,
        image_base: Option<String>,
    ) -> Result<QuizGame, JsValue> {
        let clef = Clef::parse(clef).map_err(to_js_error)?;
        let config = parse_config(config_yaml).map_err(to_js_error)?;
        let bank = match bank_json {
            Some(source) => NoteBank::from_json(clef, &source),
            None => bank::embedded(clef),
        }
        .map_err(to_js_error)?;
        let session = QuizSession::new(bank, config).map_err(to_js_error)?;
        Ok(QuizGame {
            session,
            resolver: image_base.map(UrlResolver::new).unwrap_or_default(),
        })
    }

    /// Start a session whose bank the page is still fetching. Hand the result
    /// to `loadBank` or `loadFailed`.
    pub fn awaiting(
        clef: &str,
        config_yaml: Option<String>,
        image_base: Option<String>,
    ) -> Result<QuizGame, JsValue> {
        let clef = Clef::parse(clef).map_err(to_js_error)?;
        let config = parse_config(config_yaml).map_err(to_js_error)?;
        let session = QuizSession::awaiting_bank(clef, config).map_err(to_js_error)?;
        Ok(QuizGame {
            session,
            resolver: image_base.map(UrlResolver::new).unwrap_or_default(),
        })
    }

    /// Use a fixed seed so the question order is reproducible
    pub fn seed(&mut self, seed: u32) {
        self.session.set_seed(u64::from(seed));
    }

    #[wasm_bindgen(js_name = loadBank)]
    pub fn load_bank(&mut self, bank_json: &str) -> Result<JsValue, JsValue> {
        let entries = bank::parse_entries(bank_json, BankFormat::Json).map_err(to_js_error)?;
        let snapshot = self.session.load_bank(entries).map_err(to_js_error)?;
        to_js(&snapshot)
    }

    /// Report a failed fetch; the session stays pending
    #[wasm_bindgen(js_name = loadFailed)]
    pub fn load_failed(&mut self, message: &str) -> Result<JsValue, JsValue> {
        let clef = self.session.clef();
        self.session.record_load_failure(QuizError::LoadError {
            clef,
            message: message.to_string(),
        });
        to_js(&self.session.snapshot())
    }

    pub fn tick(&mut self) -> Result<JsValue, JsValue> {
        let snapshot = self.session.tick().map_err(to_js_error)?;
        to_js(&snapshot)
    }

    #[wasm_bindgen(js_name = submitAnswer)]
    pub fn submit_answer(&mut self, label: &str) -> Result<JsValue, JsValue> {
        let label = NoteName::parse_label(label).map_err(to_js_error)?;
        let snapshot = self.session.submit_answer(label).map_err(to_js_error)?;
        to_js(&snapshot)
    }

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.snapshot())
    }

    /// Final result, or `null` while the session is still running
    pub fn summary(&self) -> Result<JsValue, JsValue> {
        match self.session.summary() {
            Some(summary) => to_js(&summary),
            None => Ok(JsValue::NULL),
        }
    }

    pub fn answers(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.answers())
    }

    /// URL of the current question's image, if there is one
    #[wasm_bindgen(js_name = imageUrl)]
    pub fn image_url(&self) -> Option<String> {
        self.session
            .current_question()
            .map(|q| self.resolver.resolve(self.session.clef(), &q.img))
    }
}

/// Names of the embedded banks, as a JSON array
#[wasm_bindgen(js_name = embeddedBanks)]
pub fn embedded_banks() -> String {
    serde_json::to_string(&bank::embedded_bank_names()).unwrap_or_else(|_| "[]".to_string())
}

/// Check a JSON bank and return diagnostics as a JSON array
#[wasm_bindgen(js_name = checkBank)]
pub fn check_bank(clef: &str, bank_json: &str) -> String {
    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    match Clef::parse(clef).and_then(|clef| NoteBank::from_json(clef, bank_json)) {
        Ok(bank) => {
            let notes = bank.notes();
            let missing: Vec<&str> = NoteName::ALL
                .iter()
                .filter(|name| !notes.contains(*name))
                .map(NoteName::as_str)
                .collect();
            if !missing.is_empty() {
                diagnostics.push(Diagnostic {
                    message: format!("No images for {}", missing.join(", ")),
                    severity: "warning".to_string(),
                });
            }
        }
        Err(e) => diagnostics.push(Diagnostic {
            message: e.to_string(),
            severity: "error".to_string(),
        }),
    }

    serde_json::to_string(&diagnostics).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_bank_reports_missing_notes() {
        let json = check_bank("treble", r#"[{"note": "A", "imgs": ["A4.png"]}]"#);
        assert!(json.contains("warning"));
        assert!(json.contains("No images for C, D, E, F, G, B"));
    }

    #[test]
    fn test_check_bank_reports_empty_bank() {
        let json = check_bank("bass", "[]");
        assert!(json.contains("error"));
        assert!(json.contains("empty"));
    }

    #[test]
    fn test_embedded_banks_listed() {
        let json = embedded_banks();
        assert!(json.contains("treble.yaml"));
    }

    #[test]
    fn test_error_kinds() {
        let info = error_to_info(&QuizError::InvalidLabel("H".to_string()));
        assert_eq!(info.kind, "invalidLabel");
        assert_eq!(info.message, "Invalid answer label: H");
    }
}
