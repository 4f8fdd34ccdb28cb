//! The translation pass: source lines to a [`TranslationUnit`].
//!
//! One [`Translator`] performs exactly one pass. It owns the frame stack,
//! the gate parser and the unit being built, and hands the unit out only
//! when the pass succeeds.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rustc_hash::FxHashMap;
use tracing::{debug, info, instrument, trace, warn};

use crate::classify::{ElementKind, classify};
use crate::config::TranslatorOptions;
use crate::element::{Element, ElementBody};
use crate::error::{NuqasmError, NuqasmResult, SourceLocation};
use crate::frame::{FrameItem, FrameStack};
use crate::gatedef::{GateDefinition, GateParser};
use crate::line::{normalize, split_statements, strip_comment};
use crate::source::{FsLoader, SourceLoader};
use crate::unit::TranslationUnit;

/// File name recorded for programs translated from a string.
pub const STRING_SOURCE: &str = "<string>";

/// Single-pass translator.
pub struct Translator<L: SourceLoader = FsLoader> {
    options: TranslatorOptions,
    loader: L,
    unit: TranslationUnit,
    frames: FrameStack,
    gate_parser: GateParser,
    /// Set once `OPENQASM 2.0;` has been seen.
    seen_declaration: bool,
    /// Resolved path to file index.
    file_ids: FxHashMap<PathBuf, usize>,
}

impl Translator<FsLoader> {
    pub fn new(options: TranslatorOptions) -> Self {
        Self::with_loader(options, FsLoader)
    }
}

impl<L: SourceLoader> Translator<L> {
    pub fn with_loader(options: TranslatorOptions, loader: L) -> Self {
        let mut unit = TranslationUnit::new(options.name.clone());
        if options.retain_program_source {
            unit.source = Some(Vec::new());
        }
        Self {
            gate_parser: GateParser::new(options.retain_gate_source),
            options,
            loader,
            unit,
            frames: FrameStack::new(),
            seen_declaration: false,
            file_ids: FxHashMap::default(),
        }
    }

    /// Translate the program in `path`.
    pub fn translate_file(mut self, path: impl AsRef<Path>) -> NuqasmResult<TranslationUnit> {
        let path = path.as_ref();
        if !self.loader.exists(path) {
            return Err(NuqasmError::CannotFindFile {
                path: path.display().to_string(),
                at: None,
            });
        }
        let path = self.loader.canonicalize(path);
        let lines = self
            .loader
            .read_lines(&path)
            .map_err(|e| NuqasmError::CannotReadFile {
                path: path.display().to_string(),
                reason: e.to_string(),
                at: None,
            })?;
        let index = self.register_file(path, &lines);
        self.frames.push(index, lines);
        self.run()
    }

    /// Translate program text. Includes are still resolved through the loader.
    pub fn translate_str(mut self, source: &str) -> NuqasmResult<TranslationUnit> {
        let lines: Vec<String> = source.lines().map(str::to_string).collect();
        let index = self.register_file(PathBuf::from(STRING_SOURCE), &lines);
        self.frames.push(index, lines);
        self.run()
    }

    #[instrument(skip_all, fields(unit = %self.unit.metadata.name))]
    fn run(mut self) -> NuqasmResult<TranslationUnit> {
        while let Some(item) = self.frames.next() {
            match item {
                FrameItem::EndOfFrame { file } => {
                    self.gate_parser.end_of_input()?;
                    self.frames.pop();
                    debug!(
                        file = %self.unit.file_name(file),
                        depth = self.frames.depth(),
                        "closed source frame"
                    );
                }
                FrameItem::Line { file, number, text } => {
                    self.process_line(file, number, &text)?;
                }
            }
        }

        self.unit.metadata.include_depth = self.frames.max_depth();
        self.unit.metadata.finished_at = Some(Utc::now());
        info!(
            files = self.unit.metadata.files.len(),
            elements = self.unit.code.len(),
            gates = self.unit.gates.len(),
            include_depth = self.unit.metadata.include_depth,
            "translation complete"
        );
        Ok(self.unit)
    }

    fn process_line(&mut self, file: usize, number: usize, raw: &str) -> NuqasmResult<()> {
        let (code, comment) = strip_comment(raw);
        let pieces = split_statements(code);

        if pieces.is_empty() {
            if let Some(text) = comment {
                self.process_statement(file, number, &format!("//{text}"), None)?;
            }
            return Ok(());
        }

        let last = pieces.len() - 1;
        for (i, piece) in pieces.iter().enumerate() {
            let trailing = if i == last { comment } else { None };
            self.process_statement(file, number, &normalize(piece), trailing)?;
        }
        Ok(())
    }

    fn process_statement(
        &mut self,
        file: usize,
        number: usize,
        text: &str,
        comment: Option<&str>,
    ) -> NuqasmResult<()> {
        let kind = classify(text);

        if !self.gate_parser.is_idle() {
            if matches!(kind, ElementKind::Blank | ElementKind::Comment) {
                trace!(line = number, "skipping comment inside gate definition");
                return Ok(());
            }
            let at = self.location(file, number, text);
            if let Some(definition) = self.gate_parser.feed(text, file, at)? {
                self.define_gate(definition);
            }
            return Ok(());
        }

        trace!(line = number, ?kind, text, "classified");
        match kind {
            ElementKind::Blank => return Ok(()),
            ElementKind::VersionDeclaration => self.seen_declaration = true,
            ElementKind::Comment => {}
            _ if !self.seen_declaration => {
                return Err(NuqasmError::DeclarationAbsent {
                    at: self.location(file, number, text),
                });
            }
            _ => {}
        }

        match kind {
            ElementKind::Include => {
                let body = ElementBody::build(kind, text);
                let target = match &body {
                    ElementBody::Include { path } => Some(path.clone()),
                    _ => None,
                };
                self.record(file, number, text, comment, body);
                if let Some(target) = target {
                    let at = self.location(file, number, text);
                    self.include(&target, at)?;
                }
            }
            ElementKind::GateDeclPlaceholder => {
                if self.options.show_gate_declarations {
                    self.record(file, number, text, comment, ElementBody::build(kind, text));
                }
                let at = self.location(file, number, text);
                if let Some(definition) = self.gate_parser.begin(text, file, at)? {
                    self.define_gate(definition);
                }
            }
            ElementKind::Unknown if self.options.strict_unknown => {
                return Err(NuqasmError::UnknownElement {
                    at: self.location(file, number, text),
                });
            }
            _ => {
                let body = ElementBody::build(kind, text);
                if matches!(body, ElementBody::Unknown { .. }) {
                    debug!(line = number, text, "unknown element");
                }
                self.record(file, number, text, comment, body);
            }
        }
        Ok(())
    }

    fn record(
        &mut self,
        file: usize,
        line: usize,
        text: &str,
        comment: Option<&str>,
        body: ElementBody,
    ) {
        self.unit.code.push(Element {
            file,
            line,
            source: self
                .options
                .retain_element_source
                .then(|| text.to_string()),
            comment: comment.filter(|c| !c.is_empty()).map(str::to_string),
            body,
        });
    }

    fn define_gate(&mut self, definition: GateDefinition) {
        if self
            .unit
            .gate(&definition.name, definition.arity())
            .is_some()
        {
            warn!(
                gate = %definition.name,
                arity = definition.arity(),
                line = definition.line,
                "gate redefined, later definition shadows earlier one"
            );
        }
        debug!(
            gate = %definition.name,
            params = definition.params.len(),
            registers = definition.registers.len(),
            ops = definition.body.len(),
            "gate defined"
        );
        self.unit.gates.push(definition);
    }

    fn include(&mut self, name: &str, at: SourceLocation) -> NuqasmResult<()> {
        let path = self
            .loader
            .resolve(name, &self.options.include_path)
            .ok_or_else(|| NuqasmError::CannotFindFile {
                path: name.to_string(),
                at: Some(at.clone()),
            })?;

        if let Some(&index) = self.file_ids.get(&path) {
            if self.frames.is_open(index) {
                return Err(NuqasmError::IncludeCycle {
                    path: path.display().to_string(),
                    at,
                });
            }
        }

        let lines = self
            .loader
            .read_lines(&path)
            .map_err(|e| NuqasmError::CannotReadFile {
                path: path.display().to_string(),
                reason: e.to_string(),
                at: Some(at),
            })?;
        debug!(path = %path.display(), lines = lines.len(), depth = self.frames.depth() + 1, "including file");
        let index = self.register_file(path, &lines);
        self.frames.push(index, lines);
        Ok(())
    }

    /// File index for `path`, assigned on first sight.
    fn register_file(&mut self, path: PathBuf, lines: &[String]) -> usize {
        if let Some(&index) = self.file_ids.get(&path) {
            return index;
        }
        let index = self.unit.metadata.files.len();
        self.unit.metadata.files.push(path.display().to_string());
        if let Some(source) = self.unit.source.as_mut() {
            source.push(lines.to_vec());
        }
        self.file_ids.insert(path, index);
        index
    }

    fn location(&self, file: usize, line: usize, text: &str) -> SourceLocation {
        SourceLocation::new(self.unit.file_name(file), line, text)
    }
}
