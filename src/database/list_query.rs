use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};

use super::catalog::{Catalog, Column, ColumnKind};
use super::filter::{Comparison, QueryDescriptor};
use crate::error::{Error, Result};
use crate::utils::time::parse_instant;

pub const DEFAULT_SIZE: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub size: i64,
    pub page: i64,
}

impl Window {
    /// Absent or non-positive values fall back to size 3, page 1.
    pub fn new(page: Option<i64>, size: Option<i64>) -> Self {
        Self {
            size: size.filter(|s| *s > 0).unwrap_or(DEFAULT_SIZE),
            page: page.filter(|p| *p > 0).unwrap_or(1),
        }
    }

    pub fn skip(&self) -> i64 {
        self.size.saturating_mul(self.page - 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone)]
enum Operand {
    Text(String),
    Timestamp(DateTime<Utc>),
}

#[derive(Debug, Clone)]
struct Predicate {
    column: &'static Column,
    op: Comparison,
    operand: Operand,
}

/// Read over one catalog table, configured step by step from a [`QueryDescriptor`].
///
/// Every step only adds to the accumulated state, so the order of calls does not
/// change the rendered statement.
#[derive(Debug, Clone)]
pub struct ListQuery<'a> {
    catalog: &'static Catalog,
    descriptor: &'a QueryDescriptor,
    window: Option<Window>,
    order: Vec<(&'static Column, Direction)>,
    projection: Option<Vec<&'static Column>>,
    predicates: Vec<Predicate>,
}

fn split_fields(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|f| !f.is_empty())
}

impl<'a> ListQuery<'a> {
    pub fn new(catalog: &'static Catalog, descriptor: &'a QueryDescriptor) -> Self {
        Self {
            catalog,
            descriptor,
            window: None,
            order: Vec::new(),
            projection: None,
            predicates: Vec::new(),
        }
    }

    pub fn window(&self) -> Option<Window> {
        self.window
    }

    pub fn paginate(mut self) -> Self {
        self.window = Some(Window::new(self.descriptor.page, self.descriptor.size));
        self
    }

    /// `a,-b` sorts by `a` ascending then `b` descending.
    pub fn sort(mut self) -> Result<Self> {
        let descriptor = self.descriptor;
        let Some(raw) = descriptor.sort.as_deref() else {
            return Ok(self);
        };
        let mut problems = Vec::new();
        for entry in split_fields(raw) {
            let (field, direction) = match entry.strip_prefix('-') {
                Some(rest) => (rest, Direction::Desc),
                None => (entry.strip_prefix('+').unwrap_or(entry), Direction::Asc),
            };
            match self.catalog.column(field) {
                Some(column) => self.order.push((column, direction)),
                None => problems.push(format!("cannot sort by unknown field `{}`", field)),
            }
        }
        if !problems.is_empty() {
            return Err(Error::Validation(problems));
        }
        Ok(self)
    }

    pub fn select(mut self) -> Result<Self> {
        let descriptor = self.descriptor;
        let Some(raw) = descriptor.select.as_deref() else {
            return Ok(self);
        };
        let mut chosen: Vec<&'static Column> = self.catalog.key_column().into_iter().collect();
        let mut problems = Vec::new();
        for field in split_fields(raw) {
            match self.catalog.column(field) {
                Some(column) if chosen.iter().any(|c| c.field == column.field) => {}
                Some(column) => chosen.push(column),
                None => problems.push(format!("cannot select unknown field `{}`", field)),
            }
        }
        if !problems.is_empty() {
            return Err(Error::Validation(problems));
        }
        self.projection = Some(chosen);
        Ok(self)
    }

    pub fn filter(mut self) -> Result<Self> {
        let descriptor = self.descriptor;
        let mut problems = Vec::new();
        for condition in &descriptor.filter {
            let Some(column) = self.catalog.column(&condition.field) else {
                problems.push(format!("cannot filter by unknown field `{}`", condition.field));
                continue;
            };
            match typed_operand(column, condition.op, &condition.value) {
                Ok(operand) => self.predicates.push(Predicate {
                    column,
                    op: condition.op,
                    operand,
                }),
                Err(problem) => problems.push(problem),
            }
        }
        if !problems.is_empty() {
            return Err(Error::Validation(problems));
        }
        Ok(self)
    }

    pub fn build(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("SELECT json_build_object(");
        let columns: Vec<&'static Column> = match &self.projection {
            Some(chosen) => chosen.clone(),
            None => self.catalog.columns.iter().collect(),
        };
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push("'").push(column.field).push("', ").push(column.projection);
        }
        qb.push(") AS doc FROM ")
            .push(self.catalog.table)
            .push(" ")
            .push(self.catalog.alias);

        for (i, predicate) in self.predicates.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            match predicate.column.kind {
                ColumnKind::TextArray => {
                    push_operand(&mut qb, &predicate.operand);
                    qb.push(" = ANY(").push(predicate.column.column).push(")");
                }
                _ => {
                    qb.push(predicate.column.column)
                        .push(" ")
                        .push(predicate.op.sql())
                        .push(" ");
                    push_operand(&mut qb, &predicate.operand);
                }
            }
        }

        qb.push(" ORDER BY ");
        if self.order.is_empty() {
            qb.push(self.catalog.default_order);
        } else {
            for (i, (column, direction)) in self.order.iter().enumerate() {
                if i > 0 {
                    qb.push(", ");
                }
                qb.push(column.column).push(" ").push(direction.sql());
            }
        }
        if let Some(key) = self.catalog.key_column() {
            qb.push(", ").push(key.column).push(" ASC");
        }

        if let Some(window) = self.window {
            qb.push(" LIMIT ").push_bind(window.size);
            qb.push(" OFFSET ").push_bind(window.skip());
        }
        qb
    }
}

fn push_operand(qb: &mut QueryBuilder<'static, Postgres>, operand: &Operand) {
    match operand {
        Operand::Text(value) => {
            qb.push_bind(value.clone());
        }
        Operand::Timestamp(value) => {
            qb.push_bind(*value);
        }
    }
}

fn typed_operand(column: &Column, op: Comparison, raw: &str) -> std::result::Result<Operand, String> {
    match column.kind {
        ColumnKind::Text => Ok(Operand::Text(raw.to_string())),
        ColumnKind::FoldedText => Ok(Operand::Text(raw.to_lowercase())),
        ColumnKind::Enumerated(check) => check(raw)
            .map(|_| Operand::Text(raw.to_string()))
            .map_err(|e| format!("{} {}", column.field, e)),
        ColumnKind::Reference => crate::utils::validation::object_id(raw)
            .map(|_| Operand::Text(raw.to_string()))
            .map_err(|_| format!("{} must be a 24 character hex identifier", column.field)),
        ColumnKind::Timestamp => parse_instant(raw)
            .map(Operand::Timestamp)
            .ok_or_else(|| format!("{} must be a date or RFC 3339 timestamp", column.field)),
        ColumnKind::TextArray => match op {
            Comparison::Eq => Ok(Operand::Text(raw.to_string())),
            Comparison::Gte | Comparison::Gt | Comparison::Lte | Comparison::Lt => {
                Err(format!("{} only supports membership filters", column.field))
            }
        },
    }
}
