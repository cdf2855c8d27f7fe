//! Word matching against the fat tree.
//!
//! A `Matcher` walks the words of a line, offering the visible children
//! at the cursor as candidates and selecting one per word. Matched nodes
//! are cloned into a result tree that mirrors the path typed; the print
//! hook and command callback are collected on the way.
//! Whatever remains offered after the last word becomes the completion
//! list.

use schemash_diagnostics::{Diagnostic, Span, codes};
use schemash_schema::{ENGINE_EXTENSION_NS, Schema, SchemaKind, SchemaNodeId};
use serde::Serialize;
use tracing::debug;

use super::lexer::{Word, Words, tokenize};
use crate::appdata::{AppDataHit, AppDataRegistry, Verdict};
use crate::behavior::BehaviorKind;
use crate::command::{CommandRegistry, Invocation, TemplateId};
use crate::env::Env;
use crate::error::{ErrorKind, ParseError};
use crate::flags::{Flag, FlagSet};
use crate::tree::fill::fill;
use crate::tree::transition::next;
use crate::tree::{Cursor, NodeId, NodeKind, Tree};

// ─── Options and results ────────────────────────────────────────────────────

/// Per-parse switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseOptions {
    /// Keywords must be typed in full; prefixes are not completed.
    pub suppress_completion: bool,
    /// Ignore leading dashes on the first word (`--show` for argv use).
    pub strip_leading_dash: bool,
    /// Match the last word even without trailing whitespace.
    pub auto_complete_last: bool,
    /// Offer only nodes that can lie on a mode path.
    pub mode_path_only: bool,
}

impl ParseOptions {
    /// Options used to execute a line: every word is matched.
    pub fn execute() -> Self {
        Self {
            auto_complete_last: true,
            ..Self::default()
        }
    }
}

/// One completion candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completion {
    /// Text offered.
    pub display: String,
    /// `prefix:name` for schema nodes, the display text otherwise.
    pub qualified: String,
    /// Help text.
    pub help: String,
    /// Another candidate has the same display text.
    pub needs_prefix: bool,
    /// The candidate is a value rather than a keyword.
    pub is_value: bool,
    /// Fat-tree node.
    #[serde(skip)]
    pub node: NodeId,
    /// Key leaf stepped through when the candidate is a positional key value.
    #[serde(skip)]
    pub via: Option<NodeId>,
}

impl Completion {
    /// Text to show: qualified when the bare name is ambiguous.
    pub fn label(&self) -> &str {
        if self.needs_prefix {
            &self.qualified
        } else {
            &self.display
        }
    }
}

/// Everything one parse attempt produced.
#[derive(Debug, Clone)]
pub struct ParseLineResult {
    /// Input line.
    pub line: String,
    /// Tokenized words.
    pub words: Vec<Word>,
    /// Options the parse ran with.
    pub options: ParseOptions,
    /// Speculative tree of every reachable position.
    pub fat: Tree,
    /// Result tree of what was matched.
    pub result: Tree,
    /// Final position in both trees.
    pub cursor: Cursor,
    /// Candidates for the next (or failing) word.
    pub completions: Vec<Completion>,
    /// Every matched word was accepted.
    pub success: bool,
    /// Why the parse failed.
    pub error: Option<ParseError>,
    /// Output hook for the command.
    pub print_hook: Option<String>,
    /// Registered command whose callback runs the line.
    pub command: Option<TemplateId>,
    /// Per app-data slot, the first result node carrying data.
    pub app_first: Vec<Option<NodeId>>,
    /// Per app-data slot, the last result node carrying data.
    pub app_last: Vec<Option<NodeId>>,
    /// Result node whose entry pushes a mode.
    pub mode_entry: Option<NodeId>,
    /// Number of words matched.
    pub consumed: usize,
    /// The matched words form a complete command.
    pub complete: bool,
}

impl ParseLineResult {
    /// Whether the line had no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Last-child chain of the result tree, root excluded.
    pub fn chain(&self) -> Vec<NodeId> {
        last_chain(&self.result)
    }

    /// Kind of the first matched node.
    pub fn top_kind(&self) -> Option<NodeKind> {
        self.result
            .children(self.result.root())
            .first()
            .map(|&n| self.result.kind(n))
    }

    /// The line starts with a behavioral keyword.
    pub fn behavior(&self) -> Option<BehaviorKind> {
        match self.top_kind() {
            Some(NodeKind::Behavior(b)) => Some(b),
            _ => None,
        }
    }

    /// Node marked as the boundary of a removal.
    pub fn delete_boundary(&self) -> Option<NodeId> {
        self.chain()
            .into_iter()
            .find(|&n| self.result.flags(n).is_set(Flag::Delete))
    }

    /// Keywords and values of a registered command line.
    pub fn invocation(&self, commands: &CommandRegistry) -> Invocation {
        let mut inv = Invocation::default();
        for id in self.chain() {
            match self.result.kind(id) {
                NodeKind::Functional(t) => inv.keywords.push(commands.template(t).keyword.clone()),
                NodeKind::InternalValue(_) => {
                    inv.values
                        .extend(self.result.node(id).value().map(str::to_string));
                }
                _ => {}
            }
        }
        inv
    }

    /// Names of mandatory inputs the matched operation leaves unset.
    pub fn check_for_mandatory(&self, schema: &Schema) -> Vec<String> {
        let mut missing = Vec::new();
        let rpc = self.chain().into_iter().find_map(|n| match self.result.kind(n) {
            NodeKind::Schema(s) if schema.node(s).kind == SchemaKind::Rpc => Some((n, s)),
            _ => None,
        });
        if let Some((node, sid)) = rpc {
            collect_missing(schema, &self.result, node, sid, &mut missing);
        }
        missing
    }

    /// Diagnostics of a failed parse.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.error.iter().map(ParseError::to_diagnostic).collect()
    }
}

fn last_chain(tree: &Tree) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut at = tree.root();
    while let Some(&last) = tree.children(at).last() {
        out.push(last);
        at = last;
    }
    out
}

fn collect_missing(
    schema: &Schema,
    tree: &Tree,
    node: NodeId,
    sid: SchemaNodeId,
    missing: &mut Vec<String>,
) {
    let present: Vec<(SchemaNodeId, NodeId)> = tree
        .children(node)
        .iter()
        .filter_map(|&c| match tree.kind(c) {
            NodeKind::Schema(s) => Some((s, c)),
            _ => None,
        })
        .collect();
    for &child in schema.data_children(sid) {
        let n = schema.node(child);
        if let Some(&(_, at)) = present.iter().find(|(s, _)| *s == child) {
            if n.kind == SchemaKind::Container {
                collect_missing(schema, tree, at, child, missing);
            }
            continue;
        }
        let required = match n.kind {
            SchemaKind::Leaf => n.mandatory,
            SchemaKind::LeafList => n.mandatory || n.min_elements > 0,
            SchemaKind::Container => !n.presence && n.has_mandatory_descendant,
            SchemaKind::List => n.min_elements > 0,
            _ => false,
        };
        // Inside a choice only the case actually taken matters.
        let case_taken = n.branches.iter().all(|br| {
            present
                .iter()
                .any(|(s, _)| schema.node(*s).branches.contains(br))
        });
        if required && case_taken {
            missing.push(n.name.clone());
        }
    }
    for &choice in &schema.node(sid).mandatory_choices {
        let taken = present
            .iter()
            .any(|(s, _)| schema.node(*s).branches.iter().any(|(c, _)| *c == choice));
        if !taken {
            missing.push(schema.node(choice).name.clone());
        }
    }
}

// ─── Public API ─────────────────────────────────────────────────────────────

/// Tokenize and match a line below the mode anchor `anchor` of `path`.
pub(crate) fn parse_line(
    env: &Env<'_>,
    appdata: &AppDataRegistry,
    path: &Tree,
    anchor: NodeId,
    line: &str,
    options: ParseOptions,
) -> ParseLineResult {
    let matcher = Matcher::new(env, appdata, path, anchor, options);
    match tokenize(line) {
        Ok(words) => matcher.run(line, words),
        Err(e) => matcher.finish(line, Vec::new(), Vec::new(), Some(e), 0, false),
    }
}

/// Match pre-split words, e.g. an argument vector.
pub(crate) fn parse_words(
    env: &Env<'_>,
    appdata: &AppDataRegistry,
    path: &Tree,
    anchor: NodeId,
    words: &[String],
    options: ParseOptions,
) -> ParseLineResult {
    let mut line = String::new();
    let mut split = Vec::with_capacity(words.len());
    for w in words {
        if !line.is_empty() {
            line.push(' ');
        }
        let start = line.len();
        line.push_str(w);
        split.push(Word::bare(w.as_str(), Span::new(start, line.len())));
    }
    let matcher = Matcher::new(env, appdata, path, anchor, options);
    matcher.run(
        &line,
        Words {
            words: split,
            trailing_space: false,
        },
    )
}

/// Print hook a mode path hands to commands typed inside it.
///
/// Hooks are taken outermost first, so the innermost one wins unless an
/// ancestor marked its hook sticky.
fn mode_print_hook(schema: &Schema, path: &Tree, anchor: NodeId) -> (Option<String>, bool) {
    let mut ancestry = vec![anchor];
    let mut at = anchor;
    while let Some(parent) = path.parent(at) {
        ancestry.push(parent);
        at = parent;
    }
    let mut hook = None;
    for &id in ancestry.iter().rev() {
        let NodeKind::Schema(sid) = path.kind(id) else {
            continue;
        };
        let n = schema.node(sid);
        if let Some(h) = n.extension_str(ENGINE_EXTENSION_NS, "print-hook") {
            hook = Some(h.to_string());
            if n.extension_bool(ENGINE_EXTENSION_NS, "print-hook-sticky") == Some(true) {
                return (hook, true);
            }
        }
    }
    (hook, false)
}

// ─── Matcher ────────────────────────────────────────────────────────────────

struct Matcher<'a> {
    env: &'a Env<'a>,
    appdata: &'a AppDataRegistry,
    options: ParseOptions,
    fat: Tree,
    res: Tree,
    cur: Cursor,
    print_hook: Option<String>,
    command: Option<TemplateId>,
    app_first: Vec<Option<NodeId>>,
    app_last: Vec<Option<NodeId>>,
}

impl<'a> Matcher<'a> {
    fn new(
        env: &'a Env<'a>,
        appdata: &'a AppDataRegistry,
        path: &Tree,
        anchor: NodeId,
        options: ParseOptions,
    ) -> Self {
        let mut flags = FlagSet::new();
        flags.set(Flag::ParseTop);
        if path.kind(anchor) == NodeKind::Schema(SchemaNodeId::ROOT) {
            flags.set(Flag::Root);
        }
        if env.config_state {
            flags.set_inherit(Flag::ConfigOnly);
        }
        if !env.profile.keys_positional() {
            flags.set_inherit(Flag::ShowKeyKeywords);
        }
        if env.profile.pop_to_sibling {
            flags.set_inherit(Flag::PopToSibling);
        }
        if env.profile.show_deprecated {
            flags.set_inherit(Flag::ShowDeprecated);
        }
        if options.mode_path_only {
            flags.set_inherit(Flag::ModePathOnly);
        }
        if !appdata.is_empty() {
            flags.set_inherit(Flag::AppDataLookup);
        }
        let (print_hook, sticky) = mode_print_hook(env.schema, path, anchor);
        if sticky {
            flags.set_inherit(Flag::PrintHookSticky);
        }
        let top = path.detach_clone(anchor).with_flags(flags);
        let mut fat = Tree::new(top);
        let res = Tree::new(fat.detach_clone(fat.root()));
        let mut cur = Cursor {
            fat: fat.root(),
            res: res.root(),
        };
        next(env, &mut fat, &res, &mut cur);
        Self {
            env,
            appdata,
            options,
            fat,
            res,
            cur,
            print_hook,
            command: None,
            app_first: vec![None; appdata.len()],
            app_last: vec![None; appdata.len()],
        }
    }

    fn run(mut self, line: &str, words: Words) -> ParseLineResult {
        let Words {
            mut words,
            trailing_space,
        } = words;
        if self.options.strip_leading_dash {
            if let Some(first) = words.first_mut().filter(|w| !w.quoted) {
                let stripped = first.text.trim_start_matches('-');
                let cut = first.text.len() - stripped.len();
                if cut > 0 && !stripped.is_empty() {
                    first.text = stripped.to_string();
                    first.span = Span::new(first.span.start + cut, first.span.end);
                }
            }
        }

        let n = words.len();
        let matched = if trailing_space || self.options.auto_complete_last {
            n
        } else {
            n.saturating_sub(1)
        };
        let mut error = None;
        let mut consumed = 0;
        let mut failed_candidates = Vec::new();
        for (i, word) in words.iter().take(matched).enumerate() {
            let candidates = self.candidates(&word.text);
            match self.select(&candidates, &word.text) {
                Ok((pick, value)) => {
                    debug!(word = %word.text, node = %candidates[pick].display, "matched");
                    if let Err(e) = self.apply(&candidates[pick], value, &word.text) {
                        error = Some(e.at_word(i, word.text.clone(), word.span));
                        break;
                    }
                    consumed = i + 1;
                }
                Err(e) => {
                    debug!(word = %word.text, kind = ?e.kind, "no match");
                    error = Some(e.at_word(i, word.text.clone(), word.span));
                    failed_candidates = candidates;
                    break;
                }
            }
        }

        let completions = if error.is_some() {
            failed_candidates
        } else {
            let partial = if matched < n { words[n - 1].text.as_str() } else { "" };
            self.candidates(partial)
        };
        let all_matched = error.is_none() && n > 0 && matched == n;
        self.finish(line, words, completions, error, consumed, all_matched)
    }

    fn finish(
        mut self,
        line: &str,
        words: Vec<Word>,
        completions: Vec<Completion>,
        error: Option<ParseError>,
        consumed: usize,
        all_matched: bool,
    ) -> ParseLineResult {
        let complete = all_matched && self.sentence_complete();
        let entry = if error.is_none() && !words.is_empty() {
            self.mark_delete();
            mode_entry(self.env.schema, &self.res)
        } else {
            None
        };
        ParseLineResult {
            line: line.to_string(),
            words,
            options: self.options,
            fat: self.fat,
            result: self.res,
            cursor: self.cur,
            completions,
            success: error.is_none(),
            error,
            print_hook: self.print_hook,
            command: self.command,
            app_first: self.app_first,
            app_last: self.app_last,
            mode_entry: entry,
            consumed,
            complete,
        }
    }

    // ── Candidates ───────────────────────────────────────────────────────

    fn candidates(&mut self, partial: &str) -> Vec<Completion> {
        let at = self.cur.fat;
        let visible: Vec<NodeId> = self.fat.visible(at).collect();
        let mut out = Vec::new();
        for v in visible {
            let positional_key = self.fat.flags(v).is_set(Flag::KeywordSuppressed)
                && matches!(self.fat.kind(v), NodeKind::Schema(_));
            if positional_key {
                fill(self.env, &mut self.fat, v);
                let values: Vec<NodeId> = self.fat.visible(v).collect();
                for c in values {
                    if self.accepts(c, partial) {
                        out.push(self.completion(c, Some(v)));
                    }
                }
            } else if self.accepts(v, partial) {
                out.push(self.completion(v, None));
            }
        }
        out.sort_by(|a, b| a.display.cmp(&b.display));
        let clashes: Vec<bool> = out
            .iter()
            .enumerate()
            .map(|(i, c)| {
                !c.is_value
                    && out
                        .iter()
                        .enumerate()
                        .any(|(j, o)| i != j && !o.is_value && o.display == c.display)
            })
            .collect();
        for (c, clash) in out.iter_mut().zip(clashes) {
            c.needs_prefix = clash;
        }
        out
    }

    fn accepts(&self, id: NodeId, partial: &str) -> bool {
        match self.fat.kind(id) {
            NodeKind::Value { leaf, index } => {
                self.env.schema.values(leaf)[usize::from(index)].accepts_partial(partial)
            }
            NodeKind::InternalValue(ty) => ty.accepts_partial(partial),
            NodeKind::Schema(sid) if partial.contains(':') => {
                self.env.schema.qualified_name(sid).starts_with(partial)
            }
            _ => self.fat.node(id).display().starts_with(partial),
        }
    }

    fn completion(&self, id: NodeId, via: Option<NodeId>) -> Completion {
        let kind = self.fat.kind(id);
        let display = self.fat.node(id).display().to_string();
        let qualified = match kind {
            NodeKind::Schema(sid) => self.env.schema.qualified_name(sid),
            _ => display.clone(),
        };
        Completion {
            help: self.env.help(&self.fat, id),
            is_value: kind.is_value(),
            needs_prefix: false,
            node: id,
            via,
            display,
            qualified,
        }
    }

    /// Values typed freely rather than as a keyword.
    fn is_typed(&self, c: &Completion) -> bool {
        match self.fat.kind(c.node) {
            NodeKind::Value { leaf, index } => {
                !self.env.schema.values(leaf)[usize::from(index)].is_keyword()
            }
            NodeKind::InternalValue(_) => true,
            _ => false,
        }
    }

    // ── Selection ────────────────────────────────────────────────────────

    /// Pick the winner for `text` and resolve its value.
    fn select(
        &self,
        candidates: &[Completion],
        text: &str,
    ) -> Result<(usize, Option<String>), ParseError> {
        let exact: Vec<usize> = (0..candidates.len())
            .filter(|&i| {
                let c = &candidates[i];
                !self.is_typed(c) && (c.display == text || c.qualified == text)
            })
            .collect();
        let typed: Vec<usize> = (0..candidates.len())
            .filter(|&i| self.is_typed(&candidates[i]))
            .collect();
        let pool: Vec<usize> = if self.options.suppress_completion {
            exact.iter().chain(&typed).copied().collect()
        } else {
            (0..candidates.len()).collect()
        };

        let pick = match (pool.len(), exact.len()) {
            (0, _) => {
                return Err(ParseError::new(
                    ErrorKind::NoCompletions,
                    format!("unrecognized word '{text}'"),
                ));
            }
            (1, _) => pool[0],
            (_, 1) => exact[0],
            (_, 0) => {
                if pool.iter().any(|i| !typed.contains(i)) {
                    return Err(ambiguous(text, candidates, &pool));
                }
                // Only union members remain; they are tried in declaration order.
                let mut first_error = None;
                for &i in &pool {
                    match self.value_text(&candidates[i], text) {
                        Ok(v) => return Ok((i, v)),
                        Err(e) => {
                            first_error.get_or_insert(e);
                        }
                    }
                }
                return Err(first_error.unwrap_or_else(|| ambiguous(text, candidates, &pool)));
            }
            _ => return Err(ambiguous(text, candidates, &exact)),
        };
        let value = self.value_text(&candidates[pick], text)?;
        Ok((pick, value))
    }

    fn value_text(&self, c: &Completion, text: &str) -> Result<Option<String>, ParseError> {
        let rejected = |msg: String| ParseError::new(ErrorKind::NoCompletions, msg);
        match self.fat.kind(c.node) {
            NodeKind::Value { leaf, index } => {
                let d = &self.env.schema.values(leaf)[usize::from(index)];
                if d.is_keyword() {
                    Ok(Some(d.display().to_string()))
                } else {
                    d.parse(text)
                        .map(Some)
                        .map_err(|e| rejected(e.to_string()))
                }
            }
            NodeKind::InternalValue(ty) => ty.parse(text).map(Some).map_err(rejected),
            NodeKind::WildcardValue(_) => Ok(Some("*".to_string())),
            _ => Ok(None),
        }
    }

    // ── Application ──────────────────────────────────────────────────────

    fn apply(&mut self, c: &Completion, value: Option<String>, word: &str) -> Result<(), ParseError> {
        if let Some(key) = c.via {
            self.fat.flags_mut(key).set(Flag::Visited);
            let r = self.res.adopt(self.cur.res, self.fat.detach_clone(key));
            self.cur = Cursor { fat: key, res: r };
            self.after_match(r, word)?;
        }
        let r = self.res.adopt(self.cur.res, self.fat.detach_clone(c.node));
        if let Some(v) = value {
            if let NodeKind::Value { leaf, .. } = self.fat.kind(c.node) {
                let node = self.env.schema.node(leaf);
                if node.kind == SchemaKind::Leaf {
                    let joined = match self.res.node(self.cur.res).value() {
                        Some(prev) if node.is_bits() => format!("{prev} {v}"),
                        _ => v.clone(),
                    };
                    self.res.set_value(self.cur.res, joined);
                }
            }
            self.res.set_value(r, v);
        }
        self.cur = Cursor {
            fat: c.node,
            res: r,
        };
        self.after_match(r, word)?;
        next(self.env, &mut self.fat, &self.res, &mut self.cur);
        Ok(())
    }

    /// App data, print hook and command bookkeeping for a new result node.
    fn after_match(&mut self, r: NodeId, word: &str) -> Result<(), ParseError> {
        let kind = self.res.kind(r);
        let schema = self.env.schema;

        if self.res.flags(r).is_set(Flag::AppDataLookup) {
            let parent = self
                .res
                .parent(r)
                .map(|p| self.res.app_data_cache(p).to_vec())
                .unwrap_or_default();
            let sid = match kind {
                NodeKind::Schema(s) => Some(s),
                _ => None,
            };
            let (cache, own) = self.appdata.propagate(schema, &parent, sid);
            self.res.set_app_data(r, cache);
            if let Some(sid) = sid {
                for slot in own {
                    self.app_first[slot.index()].get_or_insert(r);
                    self.app_last[slot.index()] = Some(r);
                    let (namespace, name) = self.appdata.key(slot);
                    let Some(value) = self.appdata.value(schema, slot, sid) else {
                        continue;
                    };
                    let hit = AppDataHit {
                        slot,
                        namespace,
                        name,
                        value,
                        node: sid,
                        word,
                    };
                    if let Verdict::Stop(message) = self.appdata.invoke(&hit) {
                        debug!(namespace, name, %message, "app data callback stopped the parse");
                        return Err(ParseError::new(ErrorKind::InvalidInput, message)
                            .with_code(codes::PARSE_EXTENSION_REJECTED));
                    }
                }
            }
        }

        let (hook, sticky) = match kind {
            NodeKind::Behavior(b) => (b.print_hook().map(str::to_string), false),
            NodeKind::Schema(sid) => {
                let n = schema.node(sid);
                (
                    n.extension_str(ENGINE_EXTENSION_NS, "print-hook")
                        .map(str::to_string),
                    n.extension_bool(ENGINE_EXTENSION_NS, "print-hook-sticky") == Some(true),
                )
            }
            _ => (None, false),
        };
        if let Some(hook) = hook {
            if self.res.flags(r).is_clear(Flag::PrintHookSticky) {
                self.print_hook = Some(hook);
                if sticky {
                    self.res.flags_mut(r).set_inherit(Flag::PrintHookSticky);
                }
            }
        }

        if let NodeKind::Functional(t) = kind {
            if self.env.commands.template(t).callback().is_some() {
                self.command = Some(t);
            }
        }
        Ok(())
    }

    // ── End of line ──────────────────────────────────────────────────────

    fn sentence_complete(&self) -> bool {
        let chain = last_chain(&self.res);
        let Some(&top) = chain.first() else {
            return false;
        };
        match self.res.kind(top) {
            NodeKind::Behavior(b) if chain.len() == 1 => return b.complete_alone(),
            NodeKind::Builtin(_) => return true,
            _ => {}
        }
        let schema = self.env.schema;
        let last = chain[chain.len() - 1];
        for &id in &chain {
            let flags = self.res.flags(id);
            let generic = flags.is_set(Flag::GenericGet);
            let children = self.res.children(id);
            match self.res.kind(id) {
                NodeKind::Schema(sid) => {
                    let n = schema.node(sid);
                    match n.kind {
                        SchemaKind::List if !generic => {
                            let keyed = schema.keys(sid).iter().all(|&k| {
                                self.res
                                    .find_child(id, NodeKind::Schema(k).clone_key())
                                    .is_some_and(|kn| !self.res.children(kn).is_empty())
                            });
                            if !keyed {
                                return false;
                            }
                        }
                        SchemaKind::Leaf | SchemaKind::LeafList
                            if !generic
                                && flags.is_clear(Flag::HideValues)
                                && !n.is_empty_leaf()
                                && children.is_empty() =>
                        {
                            return false;
                        }
                        _ => {}
                    }
                }
                NodeKind::Functional(t) => {
                    let template = self.env.commands.template(t);
                    let has_value = children
                        .iter()
                        .any(|&c| matches!(self.res.kind(c), NodeKind::InternalValue(_)));
                    if template.value.as_ref().is_some_and(|v| v.required) && !has_value {
                        return false;
                    }
                    if id == last && template.callback().is_none() && !template.children.is_empty() {
                        return false;
                    }
                }
                _ => {}
            }
        }
        true
    }

    /// Mark the node a removal applies to.
    fn mark_delete(&mut self) {
        let chain = last_chain(&self.res);
        let removes = chain
            .first()
            .is_some_and(|&t| matches!(self.res.kind(t), NodeKind::Behavior(b) if b.removes()));
        if !removes {
            return;
        }
        let schema = self.env.schema;
        let boundary = chain.iter().rev().copied().find(|&id| {
            matches!(self.res.kind(id), NodeKind::Schema(sid) if !schema.node(sid).is_key)
        });
        if let Some(b) = boundary {
            self.res.flags_mut(b).set(Flag::Delete);
        }
    }
}

/// Result node at which the line enters a mode, if any.
///
/// A list qualifies when exactly its keys were given; a container when
/// nothing below it was given (and it is a mode) or when exactly one child
/// was given and that child qualifies.
pub(crate) fn mode_entry(schema: &Schema, res: &Tree) -> Option<NodeId> {
    let [first] = res.children(res.root()) else {
        return None;
    };
    let mut node = *first;
    if let NodeKind::Behavior(b) = res.kind(node) {
        if b != BehaviorKind::Config {
            return None;
        }
        let [inner] = res.children(node) else {
            return None;
        };
        node = *inner;
    }
    if res.flags(node).is_set(Flag::HideModes) {
        return None;
    }
    qualifies(schema, res, node)
}

fn qualifies(schema: &Schema, res: &Tree, node: NodeId) -> Option<NodeId> {
    let NodeKind::Schema(sid) = res.kind(node) else {
        return None;
    };
    let children = res.children(node);
    match schema.node(sid).kind {
        SchemaKind::List => {
            let only_keys = children.len() == schema.keys(sid).len()
                && children.iter().all(|&c| {
                    matches!(res.kind(c), NodeKind::Schema(k) if schema.node(k).is_key)
                });
            (only_keys && schema.is_mode(sid)).then_some(node)
        }
        SchemaKind::Container => match children {
            [] => schema.is_mode(sid).then_some(node),
            [only] => qualifies(schema, res, *only),
            _ => None,
        },
        _ => None,
    }
}

fn ambiguous(text: &str, candidates: &[Completion], which: &[usize]) -> ParseError {
    let names: Vec<String> = which
        .iter()
        .map(|&i| candidates[i].label().to_string())
        .collect();
    ParseError::new(
        ErrorKind::Ambiguous,
        format!("ambiguous word '{text}': {}", names.join(", ")),
    )
    .with_candidates(names)
}
