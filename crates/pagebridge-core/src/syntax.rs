//! JavaScript expression recognizer.
//!
//! Answers one question: does a piece of source text parse as a single
//! standalone expression? It is used to decide whether function source can be
//! sent as-is or must be rewritten from shorthand method syntax.
//!
//! The text is tokenized (strings, template literals, regex literals and
//! comments are understood), folded into a bracket-balanced token tree, and
//! then walked by a recursive-descent recognizer for the expression grammar.
//! The contents of array literals, object literals, call arguments and
//! function bodies are only checked for balance. Parenthesized expressions
//! are recognized recursively.

use thiserror::Error;

/// Why a text failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at offset {offset}")]
pub struct SyntaxError {
    pub message: String,
    /// Character offset into the checked text.
    pub offset: usize,
}

impl SyntaxError {
    fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}

type SyntaxResult<T> = std::result::Result<T, SyntaxError>;

/// Check that `source` is exactly one expression.
pub fn check_expression(source: &str) -> SyntaxResult<()> {
    let tokens = Lexer::new(source).tokenize()?;
    let trees = build_tree(tokens, source.chars().count())?;
    let mut parser = Parser::new(&trees, source.chars().count());
    parser.expression()?;
    parser.expect_end()
}

/// Convenience wrapper around [`check_expression`].
pub fn parses_as_expression(source: &str) -> bool {
    check_expression(source).is_ok()
}

// ============================================================================
// Tokens
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Ident(String),
    Number,
    Str,
    Template,
    Regex,
    Punct(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
struct Token {
    kind: TokenKind,
    offset: usize,
}

/// Punctuators, longest first so the first match is the longest one.
const PUNCTUATORS: &[&str] = &[
    ">>>=", "...", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==",
    "!=", "<=", ">=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=",
    "|=", "^=", "**", "<<", ">>", "{", "}", "(", ")", "[", "]", ";", ",", "<", ">", "+", "-",
    "*", "/", "%", "&", "|", "^", "!", "~", "?", ":", "=", ".", "@",
];

/// Keywords after which a `/` starts a regex literal rather than a division.
const REGEX_PRECEDING_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case", "do",
    "else", "yield", "await",
];

/// Keywords whose parenthesized head is followed by a statement.
const STATEMENT_HEAD_KEYWORDS: &[&str] = &["if", "while", "for", "with"];

/// Keywords directly followed by a block.
const BLOCK_PRECEDING_KEYWORDS: &[&str] = &["else", "do", "try", "finally"];

/// What the previous significant token was, for regex/division disambiguation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prev {
    Start,
    Operand,
    Operator,
}

/// How an open bracket ends, as seen by the next token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Closer {
    /// Grouping, call arguments, object and array literals.
    Operand,
    /// `if (..)` heads and statement blocks; a statement follows.
    Statement,
    /// A template `${` substitution.
    Substitution,
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    prev: Prev,
    last: Option<TokenKind>,
    /// The last token was a word used as a property name.
    last_is_property: bool,
    closers: Vec<Closer>,
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c == '$' || c == '\\' || c == '#' || c.is_alphabetic()
}

fn is_ident_part(c: char) -> bool {
    c == '_' || c == '$' || c == '\\' || c == '\u{200c}' || c == '\u{200d}' || c.is_alphanumeric()
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            prev: Prev::Start,
            last: None,
            last_is_property: false,
            closers: Vec::new(),
        }
    }

    fn last_is_punct(&self, punct: &str) -> bool {
        matches!(self.last, Some(TokenKind::Punct(p)) if p == punct)
    }

    fn last_is_keyword(&self, keywords: &[&str]) -> bool {
        !self.last_is_property
            && matches!(&self.last, Some(TokenKind::Ident(name)) if keywords.contains(&name.as_str()))
    }

    /// A `{` opens a block after `)`, `=>`, a statement end or a block keyword.
    fn brace_opens_block(&self) -> bool {
        match &self.last {
            None => false,
            Some(TokenKind::Punct(p)) => matches!(*p, ")" | "=>" | "{" | "}" | ";"),
            Some(TokenKind::Ident(_)) => self.last_is_keyword(BLOCK_PRECEDING_KEYWORDS),
            Some(_) => false,
        }
    }

    fn peek(&self, n: usize) -> Option<char> {
        self.chars.get(self.pos + n).copied()
    }

    fn tokenize(mut self) -> SyntaxResult<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn skip_trivia(&mut self) -> SyntaxResult<()> {
        loop {
            match (self.peek(0), self.peek(1)) {
                (Some(c), _) if c.is_whitespace() || c == '\u{feff}' => self.pos += 1,
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.peek(0) {
                        if is_line_terminator(c) {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                (Some('/'), Some('*')) => {
                    let start = self.pos;
                    self.pos += 2;
                    loop {
                        match (self.peek(0), self.peek(1)) {
                            (Some('*'), Some('/')) => {
                                self.pos += 2;
                                break;
                            }
                            (Some(_), _) => self.pos += 1,
                            (None, _) => {
                                return Err(SyntaxError::new("Unterminated comment", start))
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn next_token(&mut self) -> SyntaxResult<Option<Token>> {
        self.skip_trivia()?;
        let offset = self.pos;
        let c = match self.peek(0) {
            Some(c) => c,
            None => return Ok(None),
        };

        let is_property = self.last_is_punct(".") || self.last_is_punct("?.");
        let kind = if is_ident_start(c) {
            let name = self.lex_identifier();
            self.prev = if !is_property && REGEX_PRECEDING_KEYWORDS.contains(&name.as_str()) {
                Prev::Operator
            } else {
                Prev::Operand
            };
            TokenKind::Ident(name)
        } else if c.is_ascii_digit() || (c == '.' && self.peek(1).is_some_and(|d| d.is_ascii_digit())) {
            self.lex_number();
            self.prev = Prev::Operand;
            TokenKind::Number
        } else if c == '"' || c == '\'' {
            self.lex_string(c)?;
            self.prev = Prev::Operand;
            TokenKind::Str
        } else if c == '`' {
            self.lex_template()?;
            self.prev = Prev::Operand;
            TokenKind::Template
        } else if c == '/' && self.prev != Prev::Operand {
            self.lex_regex()?;
            self.prev = Prev::Operand;
            TokenKind::Regex
        } else {
            let punct = self.lex_punct()?;
            self.prev = match punct {
                "(" => {
                    let closer = if self.last_is_keyword(STATEMENT_HEAD_KEYWORDS) {
                        Closer::Statement
                    } else {
                        Closer::Operand
                    };
                    self.closers.push(closer);
                    Prev::Operator
                }
                "{" => {
                    let closer = if self.brace_opens_block() {
                        Closer::Statement
                    } else {
                        Closer::Operand
                    };
                    self.closers.push(closer);
                    Prev::Operator
                }
                "[" => {
                    self.closers.push(Closer::Operand);
                    Prev::Operator
                }
                ")" | "]" | "}" => match self.closers.pop() {
                    Some(Closer::Statement) => Prev::Start,
                    _ => Prev::Operand,
                },
                // Postfix after an operand, prefix otherwise.
                "++" | "--" if self.prev == Prev::Operand => Prev::Operand,
                _ => Prev::Operator,
            };
            TokenKind::Punct(punct)
        };

        self.last_is_property = is_property && matches!(kind, TokenKind::Ident(_));
        self.last = Some(kind.clone());
        Ok(Some(Token { kind, offset }))
    }

    fn lex_identifier(&mut self) -> String {
        let start = self.pos;
        self.pos += 1;
        while let Some(c) = self.peek(0) {
            if !is_ident_part(c) {
                break;
            }
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn lex_number(&mut self) {
        let hex = self.peek(0) == Some('0') && matches!(self.peek(1), Some('x' | 'X'));
        while let Some(c) = self.peek(0) {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                self.pos += 1;
                if !hex && matches!(c, 'e' | 'E') && matches!(self.peek(0), Some('+' | '-')) {
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
    }

    fn lex_string(&mut self, quote: char) -> SyntaxResult<()> {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.peek(0) {
                Some('\\') => {
                    // A backslash before CRLF continues the line over both characters.
                    if self.peek(1) == Some('\r') && self.peek(2) == Some('\n') {
                        self.pos += 3;
                    } else {
                        self.pos += 2;
                    }
                }
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(());
                }
                Some('\n' | '\r') | None => {
                    return Err(SyntaxError::new("Unterminated string literal", start))
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn lex_template(&mut self) -> SyntaxResult<()> {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.peek(0) {
                Some('\\') => self.pos += 2,
                Some('`') => {
                    self.pos += 1;
                    return Ok(());
                }
                Some('$') if self.peek(1) == Some('{') => {
                    self.pos += 2;
                    self.prev = Prev::Start;
                    self.last = None;
                    self.closers.push(Closer::Substitution);
                    self.skip_substitution(start)?;
                }
                Some(_) => self.pos += 1,
                None => return Err(SyntaxError::new("Unterminated template literal", start)),
            }
        }
    }

    /// Consume tokens up to the `}` closing a `${` substitution.
    fn skip_substitution(&mut self, template_start: usize) -> SyntaxResult<()> {
        let mut depth = 0usize;
        loop {
            match self.next_token()? {
                Some(Token {
                    kind: TokenKind::Punct("{"),
                    ..
                }) => depth += 1,
                Some(Token {
                    kind: TokenKind::Punct("}"),
                    ..
                }) => {
                    if depth == 0 {
                        return Ok(());
                    }
                    depth -= 1;
                }
                Some(_) => {}
                None => {
                    return Err(SyntaxError::new(
                        "Unterminated template substitution",
                        template_start,
                    ))
                }
            }
        }
    }

    fn lex_regex(&mut self) -> SyntaxResult<()> {
        let start = self.pos;
        self.pos += 1;
        let mut in_class = false;
        loop {
            match self.peek(0) {
                Some('\\') => self.pos += 2,
                Some('[') => {
                    in_class = true;
                    self.pos += 1;
                }
                Some(']') => {
                    in_class = false;
                    self.pos += 1;
                }
                Some('/') if !in_class => {
                    self.pos += 1;
                    break;
                }
                Some(c) if is_line_terminator(c) => {
                    return Err(SyntaxError::new("Unterminated regular expression", start))
                }
                Some(_) => self.pos += 1,
                None => return Err(SyntaxError::new("Unterminated regular expression", start)),
            }
        }
        while let Some(c) = self.peek(0) {
            if !is_ident_part(c) {
                break;
            }
            self.pos += 1;
        }
        Ok(())
    }

    fn lex_punct(&mut self) -> SyntaxResult<&'static str> {
        let rest = &self.chars[self.pos..];
        for punct in PUNCTUATORS {
            let len = punct.chars().count();
            if rest.len() >= len && punct.chars().zip(rest.iter()).all(|(a, b)| a == *b) {
                // `a?.5:b` is a conditional, not optional chaining.
                if *punct == "?." && rest.get(2).is_some_and(|c| c.is_ascii_digit()) {
                    continue;
                }
                self.pos += len;
                return Ok(*punct);
            }
        }
        Err(SyntaxError::new(
            format!("Unexpected character '{}'", rest[0]),
            self.pos,
        ))
    }
}

// ============================================================================
// Token tree
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delim {
    Paren,
    Bracket,
    Brace,
}

impl Delim {
    fn open(punct: &str) -> Option<Self> {
        match punct {
            "(" => Some(Delim::Paren),
            "[" => Some(Delim::Bracket),
            "{" => Some(Delim::Brace),
            _ => None,
        }
    }

    fn close(punct: &str) -> Option<Self> {
        match punct {
            ")" => Some(Delim::Paren),
            "]" => Some(Delim::Bracket),
            "}" => Some(Delim::Brace),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Tree {
    Leaf(Token),
    Group {
        delim: Delim,
        children: Vec<Tree>,
        offset: usize,
        /// Offset of the closing delimiter.
        end: usize,
    },
}

impl Tree {
    fn offset(&self) -> usize {
        match self {
            Tree::Leaf(token) => token.offset,
            Tree::Group { offset, .. } => *offset,
        }
    }
}

fn build_tree(tokens: Vec<Token>, len: usize) -> SyntaxResult<Vec<Tree>> {
    let mut stack: Vec<(Delim, usize, Vec<Tree>)> = Vec::new();
    let mut current: Vec<Tree> = Vec::new();

    for token in tokens {
        let punct = match token.kind {
            TokenKind::Punct(p) => Some(p),
            _ => None,
        };
        if let Some(delim) = punct.and_then(Delim::open) {
            stack.push((delim, token.offset, std::mem::take(&mut current)));
        } else if let Some(delim) = punct.and_then(Delim::close) {
            let (open, offset, parent) = stack
                .pop()
                .ok_or_else(|| SyntaxError::new("Unmatched closing delimiter", token.offset))?;
            if open != delim {
                return Err(SyntaxError::new("Mismatched closing delimiter", token.offset));
            }
            let children = std::mem::replace(&mut current, parent);
            current.push(Tree::Group {
                delim,
                children,
                offset,
                end: token.offset,
            });
        } else {
            current.push(Tree::Leaf(token));
        }
    }

    match stack.pop() {
        Some((_, offset, _)) => Err(SyntaxError::new("Unclosed delimiter", offset.min(len))),
        None => Ok(current),
    }
}

// ============================================================================
// Recognizer
// ============================================================================

const ASSIGNMENT_OPERATORS: &[&str] = &[
    "=", "+=", "-=", "*=", "/=", "%=", "**=", "<<=", ">>=", ">>>=", "&=", "|=", "^=", "&&=",
    "||=", "??=",
];

const BINARY_OPERATORS: &[&str] = &[
    "+", "-", "*", "/", "%", "**", "==", "!=", "===", "!==", "<", ">", "<=", ">=", "<<", ">>",
    ">>>", "&", "|", "^", "&&", "||", "??",
];

const PREFIX_OPERATORS: &[&str] = &["!", "~", "+", "-", "++", "--"];

const PREFIX_KEYWORDS: &[&str] = &["typeof", "void", "delete", "await"];

/// Words that can never begin an expression.
const RESERVED_WORDS: &[&str] = &[
    "break", "case", "catch", "const", "continue", "debugger", "default", "do", "else", "enum",
    "export", "extends", "finally", "for", "if", "in", "instanceof", "return", "switch", "throw",
    "try", "var", "while", "with",
];

/// Reserved words of the language. None of them can name a binding.
const KEYWORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "enum", "export", "extends", "false", "finally", "for", "function", "if", "import",
    "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw", "true", "try",
    "typeof", "var", "void", "while", "with",
];

fn is_binding_identifier(name: &str) -> bool {
    !KEYWORDS.contains(&name)
}

struct Parser<'t> {
    trees: &'t [Tree],
    pos: usize,
    /// Offset reported for errors at the end of this tree list.
    end: usize,
}

impl<'t> Parser<'t> {
    fn new(trees: &'t [Tree], end: usize) -> Self {
        Self { trees, pos: 0, end }
    }

    fn peek(&self) -> Option<&'t Tree> {
        self.trees.get(self.pos)
    }

    fn peek_at(&self, n: usize) -> Option<&'t Tree> {
        self.trees.get(self.pos + n)
    }

    fn bump(&mut self) -> Option<&'t Tree> {
        let tree = self.trees.get(self.pos);
        if tree.is_some() {
            self.pos += 1;
        }
        tree
    }

    fn error_here(&self, message: &str) -> SyntaxError {
        let offset = self.peek().map_or(self.end, Tree::offset);
        SyntaxError::new(message, offset)
    }

    fn expect_end(&self) -> SyntaxResult<()> {
        match self.peek() {
            None => Ok(()),
            Some(_) => Err(self.error_here("Unexpected token")),
        }
    }

    fn at_punct(&self, punct: &str) -> bool {
        matches!(self.peek(), Some(tree) if is_punct(tree, punct))
    }

    fn at_ident(&self, name: &str) -> bool {
        matches!(self.peek(), Some(tree) if ident_name(tree) == Some(name))
    }

    fn eat_punct(&mut self, punct: &str) -> bool {
        if self.at_punct(punct) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_ident(&mut self, name: &str) -> bool {
        if self.at_ident(name) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_group(&mut self, delim: Delim, message: &str) -> SyntaxResult<&'t [Tree]> {
        match self.peek() {
            Some(Tree::Group {
                delim: d, children, ..
            }) if *d == delim => {
                self.pos += 1;
                Ok(children)
            }
            _ => Err(self.error_here(message)),
        }
    }

    fn expression(&mut self) -> SyntaxResult<()> {
        self.assignment()?;
        while self.eat_punct(",") {
            self.assignment()?;
        }
        Ok(())
    }

    fn assignment(&mut self) -> SyntaxResult<()> {
        if self.arrow_ahead() {
            return self.arrow_function();
        }
        if self.eat_ident("yield") {
            if self.peek().is_some_and(|tree| !is_expression_terminator(tree)) {
                self.eat_punct("*");
                self.assignment()?;
            }
            return Ok(());
        }
        self.conditional()?;
        if self
            .peek()
            .is_some_and(|tree| ASSIGNMENT_OPERATORS.iter().any(|op| is_punct(tree, op)))
        {
            self.pos += 1;
            self.assignment()?;
        }
        Ok(())
    }

    fn arrow_ahead(&self) -> bool {
        let params_at = if self.at_ident("async") && self.peek_at(1).is_some_and(is_arrow_params) {
            1
        } else {
            0
        };
        match (self.peek_at(params_at), self.peek_at(params_at + 1)) {
            (Some(params), Some(arrow)) => is_arrow_params(params) && is_punct(arrow, "=>"),
            _ => false,
        }
    }

    fn arrow_function(&mut self) -> SyntaxResult<()> {
        if self.peek_at(1).is_some_and(|tree| !is_punct(tree, "=>")) {
            self.eat_ident("async");
        }
        self.bump();
        self.bump();
        match self.peek() {
            Some(Tree::Group {
                delim: Delim::Brace,
                ..
            }) => {
                self.pos += 1;
                Ok(())
            }
            _ => self.assignment(),
        }
    }

    fn conditional(&mut self) -> SyntaxResult<()> {
        self.binary()?;
        if self.eat_punct("?") {
            self.assignment()?;
            if !self.eat_punct(":") {
                return Err(self.error_here("Expected ':' in conditional expression"));
            }
            self.assignment()?;
        }
        Ok(())
    }

    fn binary(&mut self) -> SyntaxResult<()> {
        self.unary()?;
        while let Some(tree) = self.peek() {
            let is_operator = BINARY_OPERATORS.iter().any(|op| is_punct(tree, op))
                || matches!(ident_name(tree), Some("in" | "instanceof"));
            if !is_operator {
                break;
            }
            self.pos += 1;
            self.unary()?;
        }
        Ok(())
    }

    fn unary(&mut self) -> SyntaxResult<()> {
        match self.peek() {
            Some(tree)
                if PREFIX_OPERATORS.iter().any(|op| is_punct(tree, op))
                    || ident_name(tree).is_some_and(|name| PREFIX_KEYWORDS.contains(&name)) =>
            {
                self.pos += 1;
                self.unary()
            }
            _ => {
                self.call_member()?;
                if self.at_punct("++") || self.at_punct("--") {
                    self.pos += 1;
                }
                Ok(())
            }
        }
    }

    fn call_member(&mut self) -> SyntaxResult<()> {
        if self.eat_ident("new") {
            if self.eat_punct(".") {
                self.property_name()?;
            } else {
                self.call_member()?;
                return Ok(());
            }
        } else {
            self.primary()?;
        }

        loop {
            match self.peek() {
                Some(tree) if is_punct(tree, ".") => {
                    self.pos += 1;
                    self.property_name()?;
                }
                Some(tree) if is_punct(tree, "?.") => {
                    self.pos += 1;
                    match self.peek() {
                        Some(Tree::Group {
                            delim: Delim::Paren | Delim::Bracket,
                            ..
                        }) => self.pos += 1,
                        _ => self.property_name()?,
                    }
                }
                Some(Tree::Group {
                    delim: Delim::Paren | Delim::Bracket,
                    ..
                }) => self.pos += 1,
                Some(Tree::Leaf(Token {
                    kind: TokenKind::Template,
                    ..
                })) => self.pos += 1,
                _ => return Ok(()),
            }
        }
    }

    fn property_name(&mut self) -> SyntaxResult<()> {
        match self.peek() {
            Some(tree) if ident_name(tree).is_some() => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(self.error_here("Expected property name")),
        }
    }

    fn primary(&mut self) -> SyntaxResult<()> {
        let tree = match self.peek() {
            Some(tree) => tree,
            None => return Err(self.error_here("Unexpected end of input")),
        };

        match tree {
            Tree::Leaf(Token {
                kind: TokenKind::Ident(name),
                ..
            }) => match name.as_str() {
                "function" => self.function_expression(false),
                "async" if self.peek_at(1).is_some_and(|next| ident_name(next) == Some("function")) => {
                    self.pos += 1;
                    self.function_expression(true)
                }
                "class" => self.class_expression(),
                "import" => {
                    self.pos += 1;
                    match self.peek() {
                        Some(Tree::Group {
                            delim: Delim::Paren,
                            ..
                        }) => Ok(()),
                        Some(next) if is_punct(next, ".") => Ok(()),
                        _ => Err(self.error_here("Unexpected token after 'import'")),
                    }
                }
                reserved if RESERVED_WORDS.contains(&reserved) => {
                    Err(self.error_here("Unexpected keyword"))
                }
                _ => {
                    self.pos += 1;
                    Ok(())
                }
            },
            Tree::Leaf(Token {
                kind: TokenKind::Number | TokenKind::Str | TokenKind::Template | TokenKind::Regex,
                ..
            }) => {
                self.pos += 1;
                Ok(())
            }
            Tree::Leaf(_) => Err(self.error_here("Unexpected token")),
            Tree::Group {
                delim: Delim::Paren,
                children,
                end,
                ..
            } => {
                let mut inner = Parser::new(children, *end);
                inner.expression()?;
                inner.expect_end()?;
                self.pos += 1;
                Ok(())
            }
            Tree::Group { .. } => {
                // Array and object literals.
                self.pos += 1;
                Ok(())
            }
        }
    }

    /// `function [*] [name] (params) { body }`, positioned at `function`.
    ///
    /// An async function cannot be named `await`, a generator cannot be
    /// named `yield`.
    fn function_expression(&mut self, is_async: bool) -> SyntaxResult<()> {
        self.bump();
        let is_generator = self.eat_punct("*");
        if let Some(name) = self.peek().and_then(ident_name) {
            if !is_binding_identifier(name)
                || (is_async && name == "await")
                || (is_generator && name == "yield")
            {
                return Err(self.error_here("Unexpected keyword as function name"));
            }
            self.pos += 1;
        }
        self.expect_group(Delim::Paren, "Expected '(' after function name")?;
        self.expect_group(Delim::Brace, "Expected function body")?;
        Ok(())
    }

    /// `class [name] [extends expr] { body }`, positioned at `class`.
    fn class_expression(&mut self) -> SyntaxResult<()> {
        self.bump();
        if self
            .peek()
            .and_then(ident_name)
            .is_some_and(is_binding_identifier)
        {
            self.pos += 1;
        }
        if self.eat_ident("extends") {
            self.call_member()?;
        }
        self.expect_group(Delim::Brace, "Expected class body")?;
        Ok(())
    }
}

fn is_punct(tree: &Tree, punct: &str) -> bool {
    matches!(tree, Tree::Leaf(Token { kind: TokenKind::Punct(p), .. }) if *p == punct)
}

fn ident_name(tree: &Tree) -> Option<&str> {
    match tree {
        Tree::Leaf(Token {
            kind: TokenKind::Ident(name),
            ..
        }) => Some(name.as_str()),
        _ => None,
    }
}

fn is_arrow_params(tree: &Tree) -> bool {
    match tree {
        Tree::Group {
            delim: Delim::Paren,
            ..
        } => true,
        other => ident_name(other).is_some_and(is_binding_identifier),
    }
}

fn is_expression_terminator(tree: &Tree) -> bool {
    is_punct(tree, ",") || is_punct(tree, ":") || is_punct(tree, ";")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrapped(source: &str) -> bool {
        parses_as_expression(&format!("({})", source))
    }

    #[test]
    fn test_function_forms_parse() {
        for source in [
            "function () { return 1; }",
            "function named(a, b = 2, ...rest) { return a + b; }",
            "async function (x) { await x; }",
            "function* gen() { yield 1; }",
            "async function* stream() {}",
            "x => x + 1",
            "(x, y) => { return x * y; }",
            "async x => await x",
            "async (a, { b, c }) => a + b + c",
            "() => ({ key: 'value' })",
            "class Foo extends Bar { method() {} }",
            "class {}",
            "function await(x) {}",
        ] {
            assert!(wrapped(source), "expected `{}` to parse", source);
        }
    }

    #[test]
    fn test_division_and_regex_are_told_apart() {
        for source in [
            "x => x++ / 2",
            "(x) => { let i = x; return i++ / 2; }",
            "(x) => x.in / 2 / 3",
            "(x) => x?.of / 2 / 3",
            "(x) => x.if(1) / 2 / 3",
            "(s) => { if (s) {} /[(]/.test(s); }",
            "function (s) { if (s) /\\(/.test(s); }",
            "function (s) { while (s) /'/.exec(s); }",
            "() => ({ a: 1 }) / 2",
            "x => `${ {a: 1}.a / 2 }` / 2",
        ] {
            assert!(wrapped(source), "expected `{}` to parse", source);
        }
    }

    #[test]
    fn test_keywords_cannot_name_functions() {
        for source in [
            "function delete(x) { return x }",
            "function new(x) {}",
            "function this() {}",
            "function* null() {}",
            "async function await() {}",
            "function* yield() {}",
            "class true {}",
            "this => 1",
        ] {
            assert!(!wrapped(source), "expected `{}` to fail", source);
        }
    }

    #[test]
    fn test_shorthand_methods_do_not_parse() {
        for source in [
            "increment(x) { return x+1 }",
            "async fetch() { return 1 }",
            "*values() { yield 1 }",
            "get value() { return 1 }",
            "[computed]() {}",
        ] {
            assert!(!wrapped(source), "expected `{}` to fail", source);
        }
    }

    #[test]
    fn test_repaired_shorthand_parses() {
        assert!(wrapped("function increment(x) { return x+1 }"));
        assert!(wrapped("async function fetch() { return 1 }"));
        assert!(!wrapped("function get value() { return 1 }"));
        assert!(!wrapped("function [computed]() {}"));
    }

    #[test]
    fn test_expressions_parse() {
        for source in [
            "1+1",
            "document.querySelector('div').textContent",
            "a ? b : c",
            "x = y ??= z",
            "typeof window !== 'undefined'",
            "new Date().getTime()",
            "new.target",
            "obj?.prop?.[key]?.(arg)",
            "tag`hello ${name} and ${nested`inner ${deep}`}`",
            "/ab+c/gi.test(s)",
            "a / b / c",
            "[1, 2, 3].map(n => n * 2)",
            "import('./module.js')",
            "'key' in obj",
            "(function () {})()",
            "(-x) ** 2",
            "i++",
        ] {
            assert!(parses_as_expression(source), "expected `{}` to parse", source);
        }
    }

    #[test]
    fn test_comments_and_strings_hide_delimiters() {
        assert!(wrapped("function () { /* ) */ return ')'; }"));
        assert!(wrapped("x => x // trailing\n"));
        assert!(wrapped("function () { return \"}\" + `{` + /[)]/.source; }"));
    }

    #[test]
    fn test_malformed_text_is_rejected() {
        for source in [
            "",
            "function () {",
            "(a, b",
            "a b",
            "if (x) { y }",
            "return 1",
            "'unterminated",
            "`unterminated ${x}",
            "x => x // swallows the closing paren",
            "a ? b",
            "{ a: 1 }) + (",
        ] {
            assert!(!wrapped(source), "expected `{}` to fail", source);
        }
    }

    #[test]
    fn test_error_offset_points_at_trailing_token() {
        let err = check_expression("a b").unwrap_err();
        assert_eq!(err.offset, 2);
        assert_eq!(err.message, "Unexpected token");
    }
}
