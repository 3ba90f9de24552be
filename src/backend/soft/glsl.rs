//! A very small GLSL ES 1.00 front end.
//!
//! It accepts comments, `precision` statements, global `attribute`,
//! `uniform` and `varying` declarations, and a `void main()` whose body
//! writes `gl_Position` from an attribute or `gl_FragColor` from a constant
//! `vec4`. Anything else is rejected with an info log in the format browsers
//! print, e.g. `ERROR: 0:3: 'foo' : syntax error`.

use crate::backend::ShaderStage;

/// Result of a successful compile.
#[derive(Debug, Clone, PartialEq)]
pub enum Compiled {
    Vertex {
        /// Declared attributes, in source order.
        attributes: Vec<String>,
        /// Attribute copied into `gl_Position`, if main writes it.
        position: Option<String>,
    },
    Fragment {
        /// Constant written to `gl_FragColor`, if main writes it.
        color: Option<[f32; 4]>,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Ident(String),
    Number(f32),
    Punct(char),
}

impl Tok {
    fn text(&self) -> String {
        match self {
            Tok::Ident(s) => s.clone(),
            Tok::Number(n) => n.to_string(),
            Tok::Punct(c) => c.to_string(),
        }
    }
}

type Spanned = (Tok, usize);

fn error(line: usize, token: &str, message: &str) -> String {
    format!("ERROR: 0:{}: '{}' : {}\n", line, token, message)
}

fn tokenize(source: &str) -> Result<Vec<Spanned>, String> {
    let bytes = source.as_bytes();
    let mut toks = Vec::new();
    let mut line = 1;
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;
        match c {
            '\n' => {
                line += 1;
                i += 1;
            }
            c if c.is_ascii_whitespace() => i += 1,
            '/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            '/' if bytes.get(i + 1) == Some(&b'*') => {
                let start = line;
                i += 2;
                loop {
                    match bytes.get(i) {
                        None => return Err(error(start, "/*", "unterminated comment")),
                        Some(b'*') if bytes.get(i + 1) == Some(&b'/') => {
                            i += 2;
                            break;
                        }
                        Some(b'\n') => {
                            line += 1;
                            i += 1;
                        }
                        Some(_) => i += 1,
                    }
                }
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                toks.push((Tok::Ident(source[start..i].to_owned()), line));
            }
            c if c.is_ascii_digit() || (c == '.' && next_is_digit(bytes, i)) => {
                let start = i;
                while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                    i += 1;
                }
                let text = &source[start..i];
                let value = text
                    .parse::<f32>()
                    .map_err(|_| error(line, text, "invalid number"))?;
                toks.push((Tok::Number(value), line));
            }
            '(' | ')' | '{' | '}' | ';' | ',' | '=' | '-' => {
                toks.push((Tok::Punct(c), line));
                i += 1;
            }
            _ => {
                let end = source[i..]
                    .char_indices()
                    .nth(1)
                    .map_or(source.len(), |(n, _)| i + n);
                return Err(error(line, &source[i..end], "invalid character"));
            }
        }
    }
    Ok(toks)
}

fn next_is_digit(bytes: &[u8], i: usize) -> bool {
    bytes.get(i + 1).map_or(false, u8::is_ascii_digit)
}

const TYPES: &[&str] = &[
    "float", "vec2", "vec3", "vec4", "mat2", "mat3", "mat4", "int", "bool",
];

struct Parser<'a> {
    stage: ShaderStage,
    toks: &'a [Spanned],
    pos: usize,
    last_line: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Tok> {
        self.toks.get(self.pos).map(|(t, _)| t)
    }

    fn line(&self) -> usize {
        self.toks.get(self.pos).map_or(self.last_line, |(_, l)| *l)
    }

    fn unexpected(&self) -> String {
        match self.peek() {
            Some(tok) => error(self.line(), &tok.text(), "syntax error"),
            None => error(self.last_line, "", "syntax error"),
        }
    }

    fn next(&mut self) -> Result<Tok, String> {
        let tok = self.peek().cloned().ok_or_else(|| self.unexpected())?;
        self.pos += 1;
        Ok(tok)
    }

    fn punct(&mut self, c: char) -> Result<(), String> {
        match self.peek() {
            Some(Tok::Punct(p)) if *p == c => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(self.unexpected()),
        }
    }

    fn ident(&mut self) -> Result<String, String> {
        match self.peek() {
            Some(Tok::Ident(s)) => {
                let s = s.clone();
                self.pos += 1;
                Ok(s)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn keyword(&mut self, allowed: &[&str]) -> Result<String, String> {
        match self.peek() {
            Some(Tok::Ident(s)) if allowed.contains(&s.as_str()) => self.ident(),
            _ => Err(self.unexpected()),
        }
    }

    fn number(&mut self) -> Result<f32, String> {
        let negative = matches!(self.peek(), Some(Tok::Punct('-')));
        if negative {
            self.pos += 1;
        }
        match self.next()? {
            Tok::Number(n) if negative => Ok(-n),
            Tok::Number(n) => Ok(n),
            _ => {
                self.pos -= 1;
                Err(self.unexpected())
            }
        }
    }
}

#[derive(Default)]
struct Unit {
    attributes: Vec<(String, String)>,
    position: Option<String>,
    color: Option<[f32; 4]>,
    has_main: bool,
}

/// Compiles `source` for `stage`, or returns the info log.
pub fn compile(stage: ShaderStage, source: &str) -> Result<Compiled, String> {
    let toks = tokenize(source)?;
    let mut p = Parser {
        stage,
        toks: &toks,
        pos: 0,
        last_line: source.lines().count().max(1),
    };
    let mut unit = Unit::default();

    while let Some(tok) = p.peek().cloned() {
        let line = p.line();
        match tok {
            Tok::Ident(ref kw) if kw == "precision" => {
                p.pos += 1;
                p.keyword(&["lowp", "mediump", "highp"])?;
                p.keyword(&["float", "int"])?;
                p.punct(';')?;
            }
            Tok::Ident(ref kw) if kw == "attribute" || kw == "uniform" || kw == "varying" => {
                if kw == "attribute" && p.stage != ShaderStage::Vertex {
                    return Err(error(line, kw, "supported in vertex shaders only"));
                }
                p.pos += 1;
                let ty = p.keyword(TYPES)?;
                let name = p.ident()?;
                p.punct(';')?;
                if kw == "attribute" {
                    if unit.attributes.iter().any(|(n, _)| *n == name) {
                        return Err(error(line, &name, "redefinition"));
                    }
                    unit.attributes.push((name, ty));
                }
            }
            Tok::Ident(ref kw) if kw == "void" => {
                p.pos += 1;
                let name = p.ident()?;
                if name != "main" {
                    return Err(error(line, &name, "only main may be defined"));
                }
                if unit.has_main {
                    return Err(error(line, "main", "function already has a body"));
                }
                p.punct('(')?;
                if matches!(p.peek(), Some(Tok::Ident(s)) if s == "void") {
                    p.pos += 1;
                }
                p.punct(')')?;
                p.punct('{')?;
                body(&mut p, &mut unit)?;
                unit.has_main = true;
            }
            _ => return Err(p.unexpected()),
        }
    }

    if !unit.has_main {
        return Err(error(p.last_line, "", "Missing main()"));
    }

    Ok(match stage {
        ShaderStage::Vertex => Compiled::Vertex {
            attributes: unit.attributes.into_iter().map(|(n, _)| n).collect(),
            position: unit.position,
        },
        ShaderStage::Fragment => Compiled::Fragment { color: unit.color },
    })
}

fn body(p: &mut Parser<'_>, unit: &mut Unit) -> Result<(), String> {
    loop {
        let line = p.line();
        match p.next()? {
            Tok::Punct('}') => return Ok(()),
            Tok::Punct(';') => {}
            Tok::Ident(target) if target == "gl_Position" => {
                if p.stage != ShaderStage::Vertex {
                    return Err(error(line, &target, "undeclared identifier"));
                }
                p.punct('=')?;
                let source_line = p.line();
                let name = p.ident()?;
                match unit.attributes.iter().find(|(n, _)| *n == name) {
                    Some((_, ty)) if ty == "vec4" => {}
                    Some(_) => {
                        return Err(error(
                            source_line,
                            "assign",
                            "cannot convert from attribute to highp 4-component vector of float",
                        ))
                    }
                    None => return Err(error(source_line, &name, "undeclared identifier")),
                }
                p.punct(';')?;
                unit.position = Some(name);
            }
            Tok::Ident(target) if target == "gl_FragColor" => {
                if p.stage != ShaderStage::Fragment {
                    return Err(error(line, &target, "undeclared identifier"));
                }
                p.punct('=')?;
                p.keyword(&["vec4"])?;
                p.punct('(')?;
                let mut color = [0.0; 4];
                for (i, c) in color.iter_mut().enumerate() {
                    if i > 0 {
                        p.punct(',')?;
                    }
                    *c = p.number()?;
                }
                p.punct(')')?;
                p.punct(';')?;
                unit.color = Some(color);
            }
            _ => {
                p.pos -= 1;
                return Err(p.unexpected());
            }
        }
    }
}
