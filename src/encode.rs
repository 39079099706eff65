use std::io::Write;

use quick_xml::events::{BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::attribute::{Attribute, QName};
use crate::error::{Error, Result};
use crate::token::Token;

/// Layout of written XML: every line starts with `prefix`, followed by
/// `indent` once per nesting level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    pub prefix: String,
    pub indent: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            prefix: String::new(),
            indent: "\t".to_string(),
        }
    }
}

impl OutputConfig {
    pub fn new(prefix: impl Into<String>, indent: impl Into<String>) -> Self {
        OutputConfig {
            prefix: prefix.into(),
            indent: indent.into(),
        }
    }

    /// Everything on one line.
    pub fn compact() -> Self {
        OutputConfig::new("", "")
    }

    fn is_compact(&self) -> bool {
        self.prefix.is_empty() && self.indent.is_empty()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Step {
    Open,
    Stay,
    Close,
}

/// Writes tokens as indented XML text.
pub struct Encoder<W: Write> {
    writer: Writer<W>,
    config: OutputConfig,
    depth: usize,
    // nothing has been written yet, so no line break is due
    at_start: bool,
    // the last indented token was a start tag
    indented_in: bool,
}

impl<W: Write> Encoder<W> {
    pub fn new(inner: W, config: &OutputConfig) -> Self {
        Encoder {
            writer: Writer::new(inner),
            config: config.clone(),
            depth: 0,
            at_start: true,
            indented_in: false,
        }
    }

    pub fn encode_token(&mut self, token: &Token) -> Result<()> {
        match token {
            Token::StartElement { name, attrs } => self.start_element(name, attrs),
            Token::EndElement(name) => self.end_element(name),
            Token::CharData(text) => self.char_data(text),
            Token::Comment(text) => self.comment(text),
            Token::Directive(text) => self.directive(text),
            Token::ProcInst { target, inst } => self.proc_inst(target, inst),
        }
    }

    pub fn start_element<'a>(
        &mut self,
        name: &QName,
        attrs: impl IntoIterator<Item = &'a Attribute>,
    ) -> Result<()> {
        let mut start = BytesStart::new(name.qualified());
        for attr in attrs {
            start.push_attribute((attr.qname().qualified().as_str(), attr.value()));
        }
        self.write_indent(Step::Open)?;
        self.writer.write_event(Event::Start(start))?;
        Ok(())
    }

    pub fn end_element(&mut self, name: &QName) -> Result<()> {
        self.write_indent(Step::Close)?;
        self.writer
            .write_event(Event::End(BytesEnd::new(name.qualified())))?;
        Ok(())
    }

    pub fn char_data(&mut self, text: &str) -> Result<()> {
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        Ok(())
    }

    /// Comment ::= '<!--' ((Char - '-') | ('-' (Char - '-')))* '-->'
    /// [https://www.w3.org/TR/xml/#sec-comments]
    pub fn comment(&mut self, text: &str) -> Result<()> {
        if text.contains("--") || text.ends_with('-') {
            return Err(Error::InvalidComment(text.to_string()));
        }
        self.write_indent(Step::Stay)?;
        self.writer
            .write_event(Event::Comment(BytesText::from_escaped(text)))?;
        Ok(())
    }

    pub fn directive(&mut self, text: &str) -> Result<()> {
        self.write_indent(Step::Stay)?;
        let out = self.writer.get_mut();
        out.write_all(b"<!")?;
        out.write_all(text.as_bytes())?;
        out.write_all(b">")?;
        Ok(())
    }

    /// PI ::= '<?' PITarget (S (Char* - (Char* '?>' Char*)))? '?>'
    /// [https://www.w3.org/TR/xml/#sec-pi]
    pub fn proc_inst(&mut self, target: &str, inst: &str) -> Result<()> {
        if target.is_empty() || target.contains("?>") || inst.contains("?>") {
            return Err(Error::InvalidProcInst(format!("{} {}", target, inst)));
        }
        let content = if inst.is_empty() {
            target.to_string()
        } else {
            format!("{} {}", target, inst)
        };
        self.write_indent(Step::Stay)?;
        self.writer.write_event(Event::PI(BytesPI::new(content)))?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.get_mut().flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn write_indent(&mut self, step: Step) -> Result<()> {
        if step == Step::Close {
            self.depth = self.depth.saturating_sub(1);
        }
        if self.config.is_compact() {
            if step == Step::Open {
                self.depth += 1;
            }
            return Ok(());
        }
        if step == Step::Close && self.indented_in {
            // only character data since the start tag, close on the same line
            self.indented_in = false;
            return Ok(());
        }

        let out = self.writer.get_mut();
        if self.at_start {
            self.at_start = false;
        } else {
            out.write_all(b"\n")?;
        }
        out.write_all(self.config.prefix.as_bytes())?;
        for _ in 0..self.depth {
            out.write_all(self.config.indent.as_bytes())?;
        }

        if step == Step::Open {
            self.depth += 1;
            self.indented_in = true;
        } else {
            self.indented_in = false;
        }
        Ok(())
    }
}
