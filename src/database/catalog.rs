use crate::models::enums::{Enumeration, JobLocation, SeniorityLevel, UnknownVariant, WorkingTime};

#[derive(Debug, Clone, Copy)]
pub enum ColumnKind {
    Text,
    /// Stored lower-cased; filter operands are folded the same way.
    FoldedText,
    Enumerated(fn(&str) -> Result<(), UnknownVariant>),
    Timestamp,
    TextArray,
    /// 24-hex identifier of another row.
    Reference,
}

#[derive(Debug)]
pub struct Column {
    pub field: &'static str,
    pub column: &'static str,
    /// Expression placed in the JSON document for this field.
    pub projection: &'static str,
    pub kind: ColumnKind,
}

#[derive(Debug)]
pub struct Catalog {
    pub table: &'static str,
    pub alias: &'static str,
    pub key: &'static str,
    pub default_order: &'static str,
    pub columns: &'static [Column],
}

impl Catalog {
    pub fn column(&self, field: &str) -> Option<&'static Column> {
        self.columns.iter().find(|c| c.field == field)
    }

    pub fn key_column(&self) -> Option<&'static Column> {
        self.column(self.key)
    }
}

fn job_location(value: &str) -> Result<(), UnknownVariant> {
    JobLocation::lookup(value).map(|_| ())
}

fn working_time(value: &str) -> Result<(), UnknownVariant> {
    WorkingTime::lookup(value).map(|_| ())
}

fn seniority_level(value: &str) -> Result<(), UnknownVariant> {
    SeniorityLevel::lookup(value).map(|_| ())
}

pub static LISTINGS: Catalog = Catalog {
    table: "listings",
    alias: "l",
    key: "id",
    default_order: "l.created_at DESC",
    columns: &[
        Column {
            field: "id",
            column: "l.id",
            projection: "l.id",
            kind: ColumnKind::Reference,
        },
        Column {
            field: "jobTitle",
            column: "l.job_title",
            projection: "l.job_title",
            kind: ColumnKind::FoldedText,
        },
        Column {
            field: "jobLocation",
            column: "l.job_location",
            projection: "l.job_location",
            kind: ColumnKind::Enumerated(job_location),
        },
        Column {
            field: "workingTime",
            column: "l.working_time",
            projection: "l.working_time",
            kind: ColumnKind::Enumerated(working_time),
        },
        Column {
            field: "seniorityLevel",
            column: "l.seniority_level",
            projection: "l.seniority_level",
            kind: ColumnKind::Enumerated(seniority_level),
        },
        Column {
            field: "jobDescription",
            column: "l.job_description",
            projection: "l.job_description",
            kind: ColumnKind::Text,
        },
        Column {
            field: "technicalSkills",
            column: "l.technical_skills",
            projection: "l.technical_skills",
            kind: ColumnKind::TextArray,
        },
        Column {
            field: "softSkills",
            column: "l.soft_skills",
            projection: "l.soft_skills",
            kind: ColumnKind::TextArray,
        },
        Column {
            field: "addedBy",
            column: "l.added_by",
            projection: "l.added_by",
            kind: ColumnKind::Reference,
        },
        Column {
            field: "company",
            column: "l.organization_id",
            projection: "(SELECT json_build_object('id', o.id, 'name', o.name, 'email', o.email, \
                'industry', o.industry, 'address', o.address, 'numberOfEmployees', o.number_of_employees) \
                FROM organizations o WHERE o.id = l.organization_id)",
            kind: ColumnKind::Reference,
        },
        Column {
            field: "createdAt",
            column: "l.created_at",
            projection: "l.created_at",
            kind: ColumnKind::Timestamp,
        },
        Column {
            field: "updatedAt",
            column: "l.updated_at",
            projection: "l.updated_at",
            kind: ColumnKind::Timestamp,
        },
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_use_wire_names() {
        assert_eq!(LISTINGS.column("jobTitle").map(|c| c.column), Some("l.job_title"));
        assert!(LISTINGS.column("job_title").is_none());
        assert_eq!(LISTINGS.key_column().map(|c| c.field), Some("id"));
    }

    #[test]
    fn enumerated_columns_check_membership() {
        match LISTINGS.column("workingTime").map(|c| c.kind) {
            Some(ColumnKind::Enumerated(check)) => {
                assert!(check("full-time").is_ok());
                assert!(check("weekends").is_err());
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }
}
