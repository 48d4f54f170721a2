//! Server-side script directives

use crate::options::{OptionMap, OptionValue};

/// Phase of request processing at which a script runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptPhase {
    /// Before the request is processed.
    PreRequest,
    /// After the request, before sorting.
    PreSort,
    /// After the request completes.
    PostRequest,
}

impl ScriptPhase {
    /// Returns the option-key suffix for this phase.
    ///
    /// The post-request script uses the unqualified `script` key; the
    /// other phases qualify it.
    const fn key_suffix(self) -> &'static str {
        match self {
            Self::PreRequest => ".prerequest",
            Self::PreSort => ".presort",
            Self::PostRequest => "",
        }
    }
}

/// A request to run a named server-side script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptDirective {
    /// When the script runs.
    pub phase: ScriptPhase,
    /// Script name.
    pub name: String,
    /// Script parameter, passed verbatim.
    pub param: String,
}

impl ScriptDirective {
    /// Creates a directive.
    #[must_use]
    pub fn new(phase: ScriptPhase, name: impl Into<String>, param: impl Into<String>) -> Self {
        Self {
            phase,
            name: name.into(),
            param: param.into(),
        }
    }
}

/// Writes script directives into an option map.
///
/// Each phase owns one `script[.phase]` / `script[.phase].param` key
/// pair; a later directive for the same phase overwrites the earlier
/// one.
pub fn script_options(directives: &[ScriptDirective], map: &mut OptionMap) {
    for directive in directives {
        let suffix = directive.phase.key_suffix();

        map.insert(
            format!("script{suffix}"),
            OptionValue::Text(directive.name.clone()),
        );
        map.insert(
            format!("script{suffix}.param"),
            OptionValue::Text(directive.param.clone()),
        );
    }
}
