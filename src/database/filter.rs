use std::collections::BTreeMap;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::{Error, Result};
use crate::middleware::validate::parse_query;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Gte,
    Gt,
    Lte,
    Lt,
}

impl Comparison {
    /// Operator keys accepted inside `field[...]`. Plain equality has no key.
    pub fn from_operator(key: &str) -> Option<Self> {
        match key {
            "gte" => Some(Comparison::Gte),
            "gt" => Some(Comparison::Gt),
            "lte" => Some(Comparison::Lte),
            "lt" => Some(Comparison::Lt),
            _ => None,
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Gte => ">=",
            Comparison::Gt => ">",
            Comparison::Lte => "<=",
            Comparison::Lt => "<",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub field: String,
    pub op: Comparison,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FilterNode {
    Leaf(String),
    Branch(BTreeMap<String, FilterNode>),
}

/// Request-scoped description of a list read: window, order, projection, filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryDescriptor {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub sort: Option<String>,
    pub select: Option<String>,
    pub filter: Vec<Condition>,
}

impl QueryDescriptor {
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut descriptor = QueryDescriptor::default();
        let mut problems = Vec::new();
        let mut tree = BTreeMap::new();

        for (key, value) in pairs {
            match key.as_str() {
                "page" => descriptor.page = parse_integer("page", &value, &mut problems),
                "size" => descriptor.size = parse_integer("size", &value, &mut problems),
                "sort" => descriptor.sort = Some(value),
                "select" => descriptor.select = Some(value),
                _ => match split_key(&key) {
                    Ok(path) => insert(&mut tree, &path, value),
                    Err(problem) => problems.push(problem),
                },
            }
        }

        for (field, node) in tree {
            lower(&field, node, None, &mut descriptor.filter, &mut problems);
        }

        if !problems.is_empty() {
            return Err(Error::Validation(problems));
        }
        Ok(descriptor)
    }
}

fn parse_integer(name: &str, raw: &str, problems: &mut Vec<String>) -> Option<i64> {
    match raw.trim().parse::<i64>() {
        Ok(n) => Some(n),
        Err(_) => {
            problems.push(format!("{} must be an integer", name));
            None
        }
    }
}

/// `price[gte]` becomes `["price", "gte"]`. Any nesting depth parses here; depth is judged in [`lower`].
fn split_key(key: &str) -> std::result::Result<Vec<String>, String> {
    let malformed = || format!("malformed filter key `{}`", key);

    let (head, mut rest) = match key.find('[') {
        Some(i) => (&key[..i], &key[i..]),
        None => (key, ""),
    };
    if head.is_empty() || head.contains(']') {
        return Err(malformed());
    }

    let mut path = vec![head.to_string()];
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[').ok_or_else(malformed)?;
        let close = inner.find(']').ok_or_else(malformed)?;
        let segment = &inner[..close];
        if segment.is_empty() || segment.contains('[') {
            return Err(malformed());
        }
        path.push(segment.to_string());
        rest = &inner[close + 1..];
    }
    Ok(path)
}

fn insert(tree: &mut BTreeMap<String, FilterNode>, path: &[String], value: String) {
    match path {
        [] => {}
        [last] => {
            tree.insert(last.clone(), FilterNode::Leaf(value));
        }
        [head, tail @ ..] => {
            let node = tree
                .entry(head.clone())
                .or_insert_with(|| FilterNode::Branch(BTreeMap::new()));
            if let FilterNode::Leaf(_) = node {
                *node = FilterNode::Branch(BTreeMap::new());
            }
            if let FilterNode::Branch(children) = node {
                insert(children, tail, value);
            }
        }
    }
}

/// Maps the parsed tree onto conditions. Only `field=value` and `field[op]=value` are accepted.
fn lower(
    field: &str,
    node: FilterNode,
    operator: Option<Comparison>,
    out: &mut Vec<Condition>,
    problems: &mut Vec<String>,
) {
    match (node, operator) {
        (FilterNode::Leaf(value), op) => out.push(Condition {
            field: field.to_string(),
            op: op.unwrap_or(Comparison::Eq),
            value,
        }),
        (FilterNode::Branch(children), None) => {
            for (key, child) in children {
                match Comparison::from_operator(&key) {
                    Some(op) => lower(field, child, Some(op), out, problems),
                    None => problems.push(format!("unknown filter operator `{}` on `{}`", key, field)),
                }
            }
        }
        (FilterNode::Branch(_), Some(_)) => {
            problems.push(format!("filter on `{}` nests deeper than field[operator]", field))
        }
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for QueryDescriptor
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        QueryDescriptor::from_pairs(parse_query(parts.uri.query()))
    }
}
