//! Parser for device class definitions.
//!
//! The catalog serves each device as the source text of a class; this module
//! turns that text into a [`ClassDef`] the builder can offer functions from.
use crate::ast::{
    AnnotationValue, Annotations, ArgDirection, ArgumentDef, ClassDef, FunctionDef, FunctionKind,
    Type,
};
use crate::error::ParseError;
use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;
use tracing::debug;

#[derive(Parser)]
#[grammar = "grammar/thingtalk.pest"]
pub struct ClassParser;

pub type ParseResult<T> = Result<T, ParseError>;

/// Parses a source text holding exactly one class.
pub fn parse_class(source: &str) -> ParseResult<ClassDef> {
    let mut classes = parse_classes(source)?;
    if classes.len() != 1 {
        return Err(ParseError::ClassCount(classes.len()));
    }
    Ok(classes.remove(0))
}

/// Parses every class in a source text, in order.
pub fn parse_classes(source: &str) -> ParseResult<Vec<ClassDef>> {
    let source = source.trim_start_matches('\u{feff}');
    let mut classes = Vec::new();
    for pair in ClassParser::parse(Rule::file, source)? {
        for inner in pair.into_inner() {
            if inner.as_rule() == Rule::class_def {
                classes.push(parse_class_def(inner)?);
            }
        }
    }
    debug!(count = classes.len(), "parsed class definitions");
    Ok(classes)
}

fn parse_class_def(pair: Pair<Rule>) -> ParseResult<ClassDef> {
    let mut class = ClassDef::default();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::class_ref => class.kind = parse_class_ref(inner),
            Rule::extends_clause => {
                class.extends = inner.into_inner().map(parse_class_ref).collect();
            }
            Rule::nl_annotation | Rule::impl_annotation => {
                let (name, value) = parse_annotation(inner)?;
                class.annotations.insert(name, value);
            }
            Rule::import_stmt => {
                if let Some(mixin) = inner.into_inner().find(|p| p.as_rule() == Rule::class_ref) {
                    class.imports.push(parse_class_ref(mixin));
                }
            }
            Rule::function_def => {
                let function = parse_function_def(inner)?;
                match function.kind {
                    FunctionKind::Query => class.queries.push(function),
                    FunctionKind::Action => class.actions.push(function),
                }
            }
            _ => {}
        }
    }
    Ok(class)
}

fn parse_class_ref(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .next()
        .map(|kind| kind.as_str().to_string())
        .unwrap_or_default()
}

fn parse_function_def(pair: Pair<Rule>) -> ParseResult<FunctionDef> {
    let mut kind = FunctionKind::Query;
    let mut name = String::new();
    let mut args = Vec::new();
    let mut is_list = false;
    let mut is_monitorable = false;
    let mut annotations = Annotations::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::function_modifier => match inner.as_str().trim() {
                "monitorable" => is_monitorable = true,
                "list" => is_list = true,
                _ => {}
            },
            Rule::function_kind => {
                kind = if inner.as_str().trim() == "action" {
                    FunctionKind::Action
                } else {
                    FunctionKind::Query
                };
            }
            Rule::ident => name = inner.as_str().to_string(),
            Rule::argument => args.push(parse_argument(inner)?),
            Rule::nl_annotation | Rule::impl_annotation => {
                let (key, value) = parse_annotation(inner)?;
                annotations.insert(key, value);
            }
            _ => {}
        }
    }

    Ok(FunctionDef {
        kind,
        name,
        args,
        is_list,
        is_monitorable,
        annotations,
    })
}

fn parse_argument(pair: Pair<Rule>) -> ParseResult<ArgumentDef> {
    let mut direction = ArgDirection::Out;
    let mut name = String::new();
    let mut ty = Type::Any;
    let mut annotations = Annotations::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::in_req => direction = ArgDirection::InReq,
            Rule::in_opt => direction = ArgDirection::InOpt,
            Rule::out_dir => direction = ArgDirection::Out,
            Rule::ident => name = inner.as_str().to_string(),
            Rule::type_ref => ty = parse_type(inner)?,
            Rule::nl_annotation | Rule::impl_annotation => {
                let (key, value) = parse_annotation(inner)?;
                annotations.insert(key, value);
            }
            _ => {}
        }
    }

    Ok(ArgumentDef {
        name,
        ty,
        direction,
        annotations,
    })
}

fn parse_type(pair: Pair<Rule>) -> ParseResult<Type> {
    let text = pair.as_str().to_string();
    let inner = pair
        .into_inner()
        .next()
        .ok_or_else(|| ParseError::UnknownType(text.clone()))?;

    match inner.as_rule() {
        Rule::array_type => {
            let element = inner
                .into_inner()
                .next()
                .ok_or_else(|| ParseError::UnknownType(text.clone()))?;
            Ok(Type::Array(Box::new(parse_type(element)?)))
        }
        Rule::simple_type => {
            let mut parts = inner.into_inner();
            let name = parts
                .next()
                .map(|p| p.as_str().to_string())
                .ok_or_else(|| ParseError::UnknownType(text.clone()))?;
            let args: Vec<String> = parts.map(|p| p.as_str().to_string()).collect();
            Type::from_parts(&name, args, None).ok_or(ParseError::UnknownType(text))
        }
        _ => Err(ParseError::UnknownType(text)),
    }
}

fn parse_annotation(pair: Pair<Rule>) -> ParseResult<(String, AnnotationValue)> {
    let named = pair
        .into_inner()
        .next()
        .ok_or_else(|| ParseError::UnknownType("annotation".to_string()))?;
    parse_named_value(named)
}

fn parse_named_value(pair: Pair<Rule>) -> ParseResult<(String, AnnotationValue)> {
    let mut inner = pair.into_inner();
    let name = inner.next().map(|p| p.as_str().to_string()).unwrap_or_default();
    let value = match inner.next() {
        Some(v) => parse_value(v)?,
        None => AnnotationValue::Boolean(true),
    };
    Ok((name, value))
}

fn parse_value(pair: Pair<Rule>) -> ParseResult<AnnotationValue> {
    match pair.as_rule() {
        Rule::string => {
            let raw = pair.into_inner().next().map(|p| p.as_str()).unwrap_or("");
            Ok(AnnotationValue::String(unescape(raw)))
        }
        Rule::boolean => Ok(AnnotationValue::Boolean(pair.as_str() == "true")),
        Rule::number => {
            let mut parts = pair.into_inner();
            let literal = parts.next().map(|p| p.as_str()).unwrap_or("");
            let value = literal
                .parse::<f64>()
                .map_err(|_| ParseError::InvalidNumber(literal.to_string()))?;
            let unit = parts.next().map(|p| p.as_str().to_string());
            Ok(AnnotationValue::Number { value, unit })
        }
        Rule::array_value => Ok(AnnotationValue::Array(
            pair.into_inner()
                .map(parse_value)
                .collect::<ParseResult<Vec<_>>>()?,
        )),
        Rule::object_value => Ok(AnnotationValue::Object(
            pair.into_inner()
                .map(parse_named_value)
                .collect::<ParseResult<Vec<_>>>()?,
        )),
        _ => Ok(AnnotationValue::Ident(pair.as_str().to_string())),
    }
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
