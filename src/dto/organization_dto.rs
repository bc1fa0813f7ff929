use serde::Deserialize;
use validator::Validate;

use crate::dto::present;
use crate::error::Result;
use crate::models::organization::{Organization, OrganizationDraft};
use crate::utils::validation::{self, lower_optional_string, trim_optional_string};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddCompanyPayload {
    #[serde(default, deserialize_with = "lower_optional_string")]
    #[validate(required(message = "is required"), custom(function = "validation::name"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    #[validate(
        required(message = "is required"),
        length(min = 5, max = 400, message = "must be between 5 and 400 characters")
    )]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lower_optional_string")]
    #[validate(required(message = "is required"), email(message = "must be a valid email"))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    #[validate(required(message = "is required"), custom(function = "validation::name"))]
    pub industry: Option<String>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub address: Option<String>,
    #[validate(range(min = 3, message = "must be at least 3"))]
    pub number_of_employees: Option<i32>,
}

impl AddCompanyPayload {
    pub fn into_draft(self) -> Result<OrganizationDraft> {
        Ok(OrganizationDraft {
            name: present(self.name, "name")?,
            description: self.description,
            industry: present(self.industry, "industry")?,
            address: self.address,
            number_of_employees: self.number_of_employees,
            email: present(self.email, "email")?,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompanyPayload {
    #[serde(default, deserialize_with = "lower_optional_string")]
    #[validate(custom(function = "validation::name"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    #[validate(length(min = 5, max = 400, message = "must be between 5 and 400 characters"))]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lower_optional_string")]
    #[validate(email(message = "must be a valid email"))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    #[validate(custom(function = "validation::name"))]
    pub industry: Option<String>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub address: Option<String>,
    #[validate(range(min = 3, message = "must be at least 3"))]
    pub number_of_employees: Option<i32>,
}

impl UpdateCompanyPayload {
    /// Fields left out keep the stored values.
    pub fn merged_with(self, current: &Organization) -> OrganizationDraft {
        OrganizationDraft {
            name: self.name.unwrap_or_else(|| current.name.clone()),
            description: self.description.or_else(|| current.description.clone()),
            industry: self.industry.unwrap_or_else(|| current.industry.clone()),
            address: self.address.or_else(|| current.address.clone()),
            number_of_employees: self.number_of_employees.or(current.number_of_employees),
            email: self.email.unwrap_or_else(|| current.email.clone()),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CompanyIdParams {
    #[validate(required(message = "is required"), custom(function = "validation::object_id"))]
    pub id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CompanyNamePayload {
    #[serde(default, deserialize_with = "lower_optional_string")]
    #[validate(required(message = "is required"))]
    pub name: Option<String>,
}
