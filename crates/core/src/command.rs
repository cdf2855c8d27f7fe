//! Registered top-level functional commands.
//!
//! Embedders register commands that are not part of the schema (`ping`,
//! `load`, `save`, ...) as a keyword with optional nested keywords, an
//! optional value and a callback. They are offered at the root mode outside
//! configuration.

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::error::EngineError;

/// Index of a command template in its [`CommandRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TemplateId(u32);

impl TemplateId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Value type of a command argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// Any word.
    String,
    /// Signed 64-bit integer.
    Integer,
    /// `true` / `false`.
    Boolean,
}

impl PrimitiveType {
    /// Completion text, `<string>` etc.
    pub fn display(self) -> &'static str {
        match self {
            PrimitiveType::String => "<string>",
            PrimitiveType::Integer => "<integer>",
            PrimitiveType::Boolean => "<boolean>",
        }
    }

    /// Whether `text` may still become a valid value.
    pub fn accepts_partial(self, text: &str) -> bool {
        match self {
            PrimitiveType::String => true,
            PrimitiveType::Integer => {
                let digits = text.strip_prefix('-').unwrap_or(text);
                digits.bytes().all(|b| b.is_ascii_digit())
            }
            PrimitiveType::Boolean => "true".starts_with(text) || "false".starts_with(text),
        }
    }

    /// Validate a complete value.
    pub fn parse(self, text: &str) -> Result<String, String> {
        match self {
            PrimitiveType::String if text.is_empty() => Err("empty value".to_string()),
            PrimitiveType::String => Ok(text.to_string()),
            PrimitiveType::Integer => text
                .parse::<i64>()
                .map(|v| v.to_string())
                .map_err(|_| format!("'{text}' is not an integer")),
            PrimitiveType::Boolean => match text {
                "true" | "false" => Ok(text.to_string()),
                _ => Err(format!("'{text}' is not true or false")),
            },
        }
    }
}

/// The value slot of a command keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueTemplate {
    /// Accepted type.
    pub ty: PrimitiveType,
    /// Help text.
    pub help: String,
    /// Whether the command is incomplete without it.
    pub required: bool,
}

/// What a command callback receives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// Matched keywords from the top-level command down.
    pub keywords: Vec<String>,
    /// Values in the order they were typed.
    pub values: Vec<String>,
}

/// Command callback. An `Err` fails the command with the given message.
pub type CommandCallback = Rc<dyn Fn(&Invocation) -> Result<(), String>>;

/// Builder for a command and its nested keywords.
#[derive(Clone)]
pub struct CommandSpec {
    keyword: String,
    help: String,
    children: Vec<CommandSpec>,
    value: Option<ValueTemplate>,
    callback: Option<CommandCallback>,
}

impl CommandSpec {
    /// A keyword with help text.
    pub fn new(keyword: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            help: help.into(),
            children: Vec::new(),
            value: None,
            callback: None,
        }
    }

    /// Add a nested keyword.
    pub fn child(mut self, child: CommandSpec) -> Self {
        self.children.push(child);
        self
    }

    /// Accept a value after the keyword.
    pub fn value(mut self, ty: PrimitiveType, help: impl Into<String>, required: bool) -> Self {
        self.value = Some(ValueTemplate {
            ty,
            help: help.into(),
            required,
        });
        self
    }

    /// Run `f` when the command is executed.
    pub fn callback(mut self, f: impl Fn(&Invocation) -> Result<(), String> + 'static) -> Self {
        self.callback = Some(Rc::new(f));
        self
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("keyword", &self.keyword)
            .field("children", &self.children)
            .field("value", &self.value)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// A registered keyword.
#[derive(Clone)]
pub struct CommandTemplate {
    /// Keyword.
    pub keyword: String,
    /// Help text.
    pub help: String,
    /// Nested keywords.
    pub children: Vec<TemplateId>,
    /// Value slot.
    pub value: Option<ValueTemplate>,
    callback: Option<CommandCallback>,
}

impl CommandTemplate {
    /// The callback, if this keyword runs something.
    pub fn callback(&self) -> Option<&CommandCallback> {
        self.callback.as_ref()
    }
}

impl fmt::Debug for CommandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandTemplate")
            .field("keyword", &self.keyword)
            .field("children", &self.children)
            .field("value", &self.value)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// All registered commands of one engine.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    templates: Vec<CommandTemplate>,
    top: Vec<TemplateId>,
    suppressed: HashSet<TemplateId>,
}

impl CommandRegistry {
    /// Register a top-level command.
    pub fn register(&mut self, spec: CommandSpec) -> Result<TemplateId, EngineError> {
        if spec.keyword.is_empty() || spec.keyword.chars().any(char::is_whitespace) {
            return Err(EngineError::InvalidKeyword(spec.keyword));
        }
        if self.find_top(&spec.keyword).is_some() {
            return Err(EngineError::DuplicateCommand(spec.keyword));
        }
        let id = self.add(spec)?;
        self.top.push(id);
        debug!(keyword = %self.template(id).keyword, "registered command");
        Ok(id)
    }

    fn add(&mut self, spec: CommandSpec) -> Result<TemplateId, EngineError> {
        let id = TemplateId(self.templates.len() as u32);
        self.templates.push(CommandTemplate {
            keyword: spec.keyword,
            help: spec.help,
            children: Vec::new(),
            value: spec.value,
            callback: spec.callback,
        });
        let mut children = Vec::with_capacity(spec.children.len());
        for child in spec.children {
            if children
                .iter()
                .any(|c: &TemplateId| self.template(*c).keyword == child.keyword)
            {
                return Err(EngineError::DuplicateCommand(child.keyword));
            }
            children.push(self.add(child)?);
        }
        self.templates[id.index()].children = children;
        Ok(id)
    }

    /// Template by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by another registry.
    pub fn template(&self, id: TemplateId) -> &CommandTemplate {
        &self.templates[id.index()]
    }

    /// Top-level commands still offered.
    pub fn top_level(&self) -> impl Iterator<Item = TemplateId> + '_ {
        self.top
            .iter()
            .copied()
            .filter(|id| !self.suppressed.contains(id))
    }

    /// Top-level command by keyword.
    pub fn find_top(&self, keyword: &str) -> Option<TemplateId> {
        self.top
            .iter()
            .copied()
            .find(|id| self.template(*id).keyword == keyword)
    }

    /// Stop offering a command.
    pub fn suppress(&mut self, id: TemplateId) {
        self.suppressed.insert(id);
    }

    /// Whether a command was suppressed.
    pub fn is_suppressed(&self, id: TemplateId) -> bool {
        self.suppressed.contains(&id)
    }

    /// Number of registered templates, nested keywords included.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_registration() {
        let mut reg = CommandRegistry::default();
        let id = reg
            .register(
                CommandSpec::new("ping", "send echo requests")
                    .value(PrimitiveType::String, "host", true)
                    .child(CommandSpec::new("count", "probes").value(
                        PrimitiveType::Integer,
                        "number of probes",
                        true,
                    )),
            )
            .unwrap();
        let ping = reg.template(id);
        assert_eq!(ping.keyword, "ping");
        assert_eq!(ping.children.len(), 1);
        assert_eq!(reg.template(ping.children[0]).keyword, "count");
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.find_top("ping"), Some(id));
        assert_eq!(reg.find_top("count"), None);
    }

    #[test]
    fn duplicate_keyword_is_rejected() {
        let mut reg = CommandRegistry::default();
        reg.register(CommandSpec::new("load", "")).unwrap();
        assert!(matches!(
            reg.register(CommandSpec::new("load", "")),
            Err(EngineError::DuplicateCommand(k)) if k == "load"
        ));
        assert!(matches!(
            reg.register(CommandSpec::new("two words", "")),
            Err(EngineError::InvalidKeyword(_))
        ));
    }

    #[test]
    fn suppressed_commands_are_not_offered() {
        let mut reg = CommandRegistry::default();
        let a = reg.register(CommandSpec::new("a", "")).unwrap();
        let b = reg.register(CommandSpec::new("b", "")).unwrap();
        reg.suppress(a);
        assert_eq!(reg.top_level().collect::<Vec<_>>(), vec![b]);
    }

    #[test]
    fn primitive_values() {
        assert!(PrimitiveType::Integer.accepts_partial("-1"));
        assert!(!PrimitiveType::Integer.accepts_partial("1x"));
        assert_eq!(PrimitiveType::Integer.parse("042").unwrap(), "42");
        assert!(PrimitiveType::Boolean.accepts_partial("tr"));
        assert!(PrimitiveType::Boolean.parse("yes").is_err());
        assert!(PrimitiveType::String.parse("").is_err());
    }
}
