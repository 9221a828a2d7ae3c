//! Parse schema source into a [`Schema`] using PEST.
//!
//! Declarations are processed in order, so a struct may only refer to
//! parameters and structs declared above it.

use crate::ast::{Arg, ArrayDim, Bindings, Field, FieldType};
use crate::error::LayoutError;
use crate::schema::Schema;
use crate::template::StructDef;
use pest::Parser;
use pest_derive::Parser as PestParser;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(PestParser)]
#[grammar = "grammar.pest"]
struct SchemaParser;

type Pair<'a> = pest::iterators::Pair<'a, Rule>;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Parse error: {0}")]
    Syntax(#[from] Box<pest::error::Error<Rule>>),
    #[error("line {line}: unknown name `{name}`")]
    UnknownName { line: usize, name: String },
    #[error("line {line}: `{name}` is already defined")]
    DuplicateName { line: usize, name: String },
    #[error("line {line}: parameter `{name}` bound twice")]
    DuplicateBinding { line: usize, name: String },
    #[error("line {line}: invalid integer `{text}`")]
    InvalidInteger { line: usize, text: String },
    #[error("line {line}: {source}")]
    Layout {
        line: usize,
        #[source]
        source: LayoutError,
    },
    #[error("line {line}: nesting deeper than {limit} levels")]
    TooDeep { line: usize, limit: usize },
    #[error("Malformed {0}")]
    Malformed(&'static str),
}

impl ParseError {
    /// The underlying layout error, if this is one.
    pub fn layout_error(&self) -> Option<&LayoutError> {
        match self {
            ParseError::Layout { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::Syntax(e) => match &e.line_col {
                pest::error::LineColLocation::Pos((line, _)) => Some(*line),
                pest::error::LineColLocation::Span((line, _), _) => Some(*line),
            },
            ParseError::UnknownName { line, .. }
            | ParseError::DuplicateName { line, .. }
            | ParseError::DuplicateBinding { line, .. }
            | ParseError::InvalidInteger { line, .. }
            | ParseError::TooDeep { line, .. }
            | ParseError::Layout { line, .. } => Some(*line),
            ParseError::Malformed(_) => None,
        }
    }
}

/// Deepest `(` / `{` nesting accepted; deeper input is rejected before parsing.
pub const MAX_NESTING: usize = 64;

/// Parse schema source.
pub fn parse(source: &str) -> Result<Schema, ParseError> {
    check_nesting(source)?;
    let pairs = SchemaParser::parse(Rule::schema, source).map_err(Box::new)?;
    let pair = pairs.into_iter().next().ok_or(ParseError::Malformed("empty parse"))?;
    let mut schema = Schema::default();
    for item in pair.into_inner() {
        match item.as_rule() {
            Rule::param_decl => build_params(&mut schema, item)?,
            Rule::struct_decl => build_struct(&mut schema, item)?,
            Rule::let_decl => build_let(&mut schema, item)?,
            _ => {}
        }
    }
    tracing::debug!(params = schema.params().len(), entries = schema.len(), "parsed schema");
    Ok(schema)
}

/// Bracket depth outside comments, which bounds the recursion of both the
/// grammar and the builders below.
fn check_nesting(source: &str) -> Result<(), ParseError> {
    let mut depth = 0usize;
    let mut line = 1usize;
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\n' => line += 1,
            '/' if chars.peek() == Some(&'/') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        line += 1;
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = ' ';
                for c in chars.by_ref() {
                    if c == '\n' {
                        line += 1;
                    }
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            '(' | '{' => {
                depth += 1;
                if depth > MAX_NESTING {
                    return Err(ParseError::TooDeep {
                        line,
                        limit: MAX_NESTING,
                    });
                }
            }
            ')' | '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

fn line_of(pair: &Pair) -> usize {
    pair.as_span().start_pos().line_col().0
}

fn layout(line: usize) -> impl FnOnce(LayoutError) -> ParseError {
    move |source| ParseError::Layout { line, source }
}

fn build_params(schema: &mut Schema, pair: Pair) -> Result<(), ParseError> {
    for ident in pair.into_inner() {
        if !schema.insert_param(ident.as_str()) {
            return Err(ParseError::DuplicateName {
                line: line_of(&ident),
                name: ident.as_str().to_string(),
            });
        }
    }
    Ok(())
}

fn build_struct(schema: &mut Schema, pair: Pair) -> Result<(), ParseError> {
    let line = line_of(&pair);
    let mut inner = pair.into_inner();
    let name_pair = inner.next().ok_or(ParseError::Malformed("struct name"))?;
    let name = name_pair.as_str();
    let mut fields = Vec::new();
    for field_pair in inner {
        let mut it = field_pair.into_inner();
        let field_name = it.next().ok_or(ParseError::Malformed("field name"))?;
        let ty = it.next().ok_or(ParseError::Malformed("field type"))?;
        fields.push(Field::new(field_name.as_str(), build_type_expr(schema, ty)?));
    }
    let def = StructDef::define(name, fields).map_err(layout(line))?;
    if !schema.insert_type(name, FieldType::from(def)) {
        return Err(ParseError::DuplicateName {
            line,
            name: name.to_string(),
        });
    }
    Ok(())
}

fn build_let(schema: &mut Schema, pair: Pair) -> Result<(), ParseError> {
    let line = line_of(&pair);
    let mut inner = pair.into_inner();
    let name = inner.next().ok_or(ParseError::Malformed("let name"))?.as_str();
    let value = inner.next().ok_or(ParseError::Malformed("let value"))?;
    let ty = build_type_expr(schema, value)?;
    if !schema.insert_type(name, ty) {
        return Err(ParseError::DuplicateName {
            line,
            name: name.to_string(),
        });
    }
    Ok(())
}

fn build_type_expr(schema: &Schema, pair: Pair) -> Result<FieldType, ParseError> {
    let mut inner = pair.into_inner();
    let head = inner.next().ok_or(ParseError::Malformed("type expression"))?;
    let mut ty = build_type_postfix(schema, head)?;
    for arg in inner {
        let line = line_of(&arg);
        let bindings = build_binding_arg(schema, arg)?;
        let def = ty
            .as_struct()
            .map(Arc::clone)
            .ok_or_else(|| ParseError::Layout {
                line,
                source: LayoutError::NotSpecializable(ty.to_string()),
            })?;
        ty = FieldType::from(def.specialize(bindings).map_err(layout(line))?);
    }
    Ok(ty)
}

/// `base[d0][d1]...`; the written dims become the outermost ones.
fn build_type_postfix(schema: &Schema, pair: Pair) -> Result<FieldType, ParseError> {
    let mut inner = pair.into_inner();
    let head = inner.next().ok_or(ParseError::Malformed("type"))?;
    let base = match head.as_rule() {
        Rule::ident => resolve_name(schema, &head)?,
        Rule::type_expr => build_type_expr(schema, head)?,
        _ => return Err(ParseError::Malformed("type")),
    };
    let mut dims = Vec::new();
    for dim in inner {
        let line = line_of(&dim);
        let value = dim.into_inner().next().ok_or(ParseError::Malformed("dimension"))?;
        let arg = build_scalar(schema, value)?;
        dims.push(ArrayDim::try_from(arg).map_err(layout(line))?);
    }
    dims.extend(base.dims);
    Ok(FieldType {
        element: base.element,
        dims,
    })
}

fn build_binding_arg(schema: &Schema, pair: Pair) -> Result<Bindings, ParseError> {
    match pair.as_rule() {
        Rule::binding_map => {
            let mut map = BTreeMap::new();
            for binding in pair.into_inner() {
                let line = line_of(&binding);
                let mut it = binding.into_inner();
                let key = it.next().ok_or(ParseError::Malformed("binding name"))?.as_str();
                let value = it.next().ok_or(ParseError::Malformed("binding value"))?;
                let arg = match value.as_rule() {
                    Rule::type_expr => Arg::Type(build_type_expr(schema, value)?),
                    _ => build_scalar(schema, value)?,
                };
                if map.insert(key.to_string(), arg).is_some() {
                    return Err(ParseError::DuplicateBinding {
                        line,
                        name: key.to_string(),
                    });
                }
            }
            Ok(Bindings::Named(map))
        }
        Rule::type_postfix => Ok(Bindings::Single(Arg::Type(build_type_postfix(schema, pair)?))),
        _ => Ok(Bindings::Single(build_scalar(schema, pair)?)),
    }
}

/// An integer literal or a single name.
fn build_scalar(schema: &Schema, pair: Pair) -> Result<Arg, ParseError> {
    match pair.as_rule() {
        Rule::int_lit => pair
            .as_str()
            .parse::<u64>()
            .map(Arg::Length)
            .map_err(|_| ParseError::InvalidInteger {
                line: line_of(&pair),
                text: pair.as_str().to_string(),
            }),
        Rule::ident => resolve_name(schema, &pair).map(Arg::Type),
        _ => Err(ParseError::Malformed("scalar")),
    }
}

fn resolve_name(schema: &Schema, pair: &Pair) -> Result<FieldType, ParseError> {
    schema.lookup(pair.as_str()).ok_or_else(|| ParseError::UnknownName {
        line: line_of(pair),
        name: pair.as_str().to_string(),
    })
}
