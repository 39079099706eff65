use std::collections::VecDeque;

use xmlparser::{ElementEnd, StrSpan, Tokenizer};

use crate::attribute::{Attribute, QName};
use crate::error::Result;
use crate::token::Token;
use crate::util::{trim_xml, unescape};

/// Adapts the low-level tokens of [`xmlparser::Tokenizer`] to [`Token`]s.
///
/// Attributes are folded into their start tag, empty element tags expand to
/// a start/end pair and a DOCTYPE (with its internal subset) becomes a single
/// directive.
///
/// `xmlparser` refuses markup after the root element has been closed. At that
/// point the rest of the input is tokenized again as element content, so a
/// second top-level element reaches the tree builder (which reports it as a
/// duplicate root) and trailing text is handed on instead of failing here.
pub struct XmlTokenizer<'a> {
    xml: &'a str,
    inner: Tokenizer<'a>,
    pending: VecDeque<Token>,
    open: Option<(QName, Vec<Attribute>)>,
    dtd_start: Option<usize>,
    depth: usize,
    root_closed: bool,
    /// Byte offset just past the last token read from `inner`.
    consumed: usize,
    resumed: bool,
    done: bool,
}

impl<'a> XmlTokenizer<'a> {
    pub fn new(xml: &'a str) -> Self {
        XmlTokenizer {
            xml,
            inner: Tokenizer::from(xml),
            pending: VecDeque::new(),
            open: None,
            dtd_start: None,
            depth: 0,
            root_closed: false,
            consumed: 0,
            resumed: false,
            done: false,
        }
    }

    /// Continues after the root element by reading the unconsumed input as a
    /// fragment. Only done once; returns `false` if it does not apply.
    fn resume_after_root(&mut self) -> bool {
        if !self.root_closed || self.resumed {
            return false;
        }
        self.resumed = true;
        self.inner = Tokenizer::from_fragment(self.xml, self.consumed..self.xml.len());
        true
    }

    /// Feeds one low-level token, queueing whatever complete tokens it yields.
    fn feed(&mut self, token: xmlparser::Token<'a>) -> Result<()> {
        use xmlparser::Token as Raw;

        match token {
            Raw::Declaration { span, .. } => {
                // XMLDecl ::= '<?xml' VersionInfo EncodingDecl? SDDecl? S? '?>'
                // [https://www.w3.org/TR/xml/#NT-XMLDecl]
                let text = span.as_str();
                let inst = text
                    .strip_prefix("<?xml")
                    .and_then(|rest| rest.strip_suffix("?>"))
                    .unwrap_or_default();
                self.pending.push_back(Token::ProcInst {
                    target: "xml".to_string(),
                    inst: trim_xml(inst).to_string(),
                });
            }
            Raw::ProcessingInstruction { target, content, .. } => {
                self.pending.push_back(Token::ProcInst {
                    target: target.as_str().to_string(),
                    inst: content
                        .map(|c| trim_xml(c.as_str()).to_string())
                        .unwrap_or_default(),
                });
            }
            Raw::Comment { text, .. } => {
                self.pending.push_back(Token::Comment(text.as_str().to_string()));
            }
            Raw::EmptyDtd { span, .. } => {
                self.pending.push_back(Token::Directive(directive_text(span.as_str())));
            }
            Raw::DtdStart { span, .. } => {
                self.dtd_start = Some(span.start());
            }
            Raw::EntityDeclaration { .. } => {}
            Raw::DtdEnd { span } => {
                let start = self.dtd_start.take().unwrap_or_else(|| span.start());
                let text = &self.xml[start..span.end()];
                self.pending.push_back(Token::Directive(directive_text(text)));
            }
            Raw::ElementStart { prefix, local, .. } => {
                self.open = Some((qname(prefix, local), Vec::new()));
            }
            Raw::Attribute { prefix, local, value, .. } => {
                let value = unescape(value.as_str())?;
                if let Some((_, attrs)) = self.open.as_mut() {
                    attrs.push(Attribute::new(
                        prefix.as_str(),
                        local.as_str(),
                        value,
                    ));
                }
            }
            Raw::ElementEnd { end, .. } => match end {
                ElementEnd::Open => {
                    self.flush_start();
                    self.depth += 1;
                }
                ElementEnd::Empty => {
                    if let Some(name) = self.flush_start() {
                        self.pending.push_back(Token::EndElement(name));
                    }
                    self.root_closed |= self.depth == 0;
                }
                ElementEnd::Close(prefix, local) => {
                    self.pending.push_back(Token::EndElement(qname(prefix, local)));
                    self.depth = self.depth.saturating_sub(1);
                    self.root_closed |= self.depth == 0;
                }
            },
            Raw::Text { text } => {
                self.pending
                    .push_back(Token::CharData(unescape(text.as_str())?.into_owned()));
            }
            Raw::Cdata { text, .. } => {
                self.pending.push_back(Token::CharData(text.as_str().to_string()));
            }
        }
        Ok(())
    }

    /// Emits the start tag collected so far and returns its name.
    fn flush_start(&mut self) -> Option<QName> {
        let (name, attrs) = self.open.take()?;
        self.pending.push_back(Token::StartElement {
            name: name.clone(),
            attrs,
        });
        Some(name)
    }
}

impl<'a> Iterator for XmlTokenizer<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(Ok(token));
            }
            if self.done {
                return None;
            }
            match self.inner.next() {
                None => self.done = true,
                Some(Err(err)) => {
                    if self.resume_after_root() {
                        continue;
                    }
                    self.done = true;
                    return Some(Err(err.into()));
                }
                Some(Ok(token)) => {
                    self.consumed = span_end(&token);
                    if let Err(err) = self.feed(token) {
                        self.done = true;
                        return Some(Err(err));
                    }
                }
            }
        }
    }
}

fn span_end(token: &xmlparser::Token) -> usize {
    use xmlparser::Token as Raw;

    match token {
        Raw::Declaration { span, .. }
        | Raw::ProcessingInstruction { span, .. }
        | Raw::Comment { span, .. }
        | Raw::DtdStart { span, .. }
        | Raw::EmptyDtd { span, .. }
        | Raw::EntityDeclaration { span, .. }
        | Raw::DtdEnd { span }
        | Raw::ElementStart { span, .. }
        | Raw::Attribute { span, .. }
        | Raw::ElementEnd { span, .. }
        | Raw::Cdata { span, .. } => span.end(),
        Raw::Text { text } => text.end(),
    }
}

fn qname(prefix: StrSpan, local: StrSpan) -> QName {
    QName::new(prefix.as_str(), local.as_str())
}

/// The payload between `<!` and the closing `>`.
fn directive_text(markup: &str) -> String {
    let inner = markup.strip_prefix("<!").unwrap_or(markup);
    inner.strip_suffix('>').unwrap_or(inner).to_string()
}
