//! Filter compilation.
//!
//! Raw filter parameters are validated and compiled into an
//! [`IncidentFilter`] before any record is read. Incident-scoped
//! constraints (`year`, `state`, `ori`) decide whether an incident is
//! visible at all; the offense-scoped `offense_code` constraint decides
//! which of its offenses may contribute to counts.

use crime_data_crime_models::{Agency, Incident, Offense};
use crime_data_query_models::FilterParams;

use crate::QueryError;
use crate::params::present;

const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 9999;
const MAX_OFFENSE_CODE_LEN: usize = 4;
const MAX_ORI_LEN: usize = 12;

/// Compiled predicate over incidents and their offenses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncidentFilter {
    offense_code: Option<String>,
    year: Option<i32>,
    state: Option<String>,
    ori: Option<String>,
}

impl IncidentFilter {
    /// Validates and compiles the raw filter parameters.
    ///
    /// Blank values are treated as absent. A well-formed value that matches
    /// nothing is accepted and simply yields no records.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidParameter`] if a value is malformed.
    pub fn compile(params: &FilterParams) -> Result<Self, QueryError> {
        let offense_code = present(params.offense_code.as_deref())
            .map(|code| {
                if code.len() <= MAX_OFFENSE_CODE_LEN
                    && code.chars().all(|c| c.is_ascii_alphanumeric())
                {
                    Ok(code.to_ascii_uppercase())
                } else {
                    Err(QueryError::invalid(
                        "offense_code",
                        format!("'{code}' is not a NIBRS offense code"),
                    ))
                }
            })
            .transpose()?;

        let year = present(params.year.as_deref())
            .map(|raw| {
                raw.parse::<i32>()
                    .ok()
                    .filter(|y| (MIN_YEAR..=MAX_YEAR).contains(y))
                    .ok_or_else(|| {
                        QueryError::invalid(
                            "year",
                            format!("'{raw}' is not a year between {MIN_YEAR} and {MAX_YEAR}"),
                        )
                    })
            })
            .transpose()?;

        let state = present(params.state.as_deref())
            .map(|raw| {
                if raw.len() == 2 && raw.chars().all(|c| c.is_ascii_alphabetic()) {
                    Ok(raw.to_ascii_uppercase())
                } else {
                    Err(QueryError::invalid(
                        "state",
                        format!("'{raw}' is not a two-letter state abbreviation"),
                    ))
                }
            })
            .transpose()?;

        let ori = present(params.ori.as_deref())
            .map(|raw| {
                if raw.len() <= MAX_ORI_LEN && raw.chars().all(|c| c.is_ascii_alphanumeric()) {
                    Ok(raw.to_ascii_uppercase())
                } else {
                    Err(QueryError::invalid(
                        "ori",
                        format!("'{raw}' is not an ORI code"),
                    ))
                }
            })
            .transpose()?;

        Ok(Self {
            offense_code,
            year,
            state,
            ori,
        })
    }

    /// Whether any offense-scoped constraint is active.
    #[must_use]
    pub const fn constrains_offenses(&self) -> bool {
        self.offense_code.is_some()
    }

    /// Checks the incident-scoped constraints.
    #[must_use]
    pub fn matches_incident(&self, incident: &Incident, agency: &Agency) -> bool {
        if let Some(year) = self.year
            && incident.year() != year
        {
            return false;
        }
        if let Some(state) = &self.state
            && !agency.state.eq_ignore_ascii_case(state)
        {
            return false;
        }
        if let Some(ori) = &self.ori
            && !agency.ori.eq_ignore_ascii_case(ori)
        {
            return false;
        }
        true
    }

    /// Checks the offense-scoped constraints.
    #[must_use]
    pub fn matches_offense(&self, offense: &Offense) -> bool {
        self.offense_code.as_deref().is_none_or(|code| {
            offense
                .offense_type
                .offense_code
                .eq_ignore_ascii_case(code)
        })
    }

    /// Offenses of `incident` allowed to contribute to counts.
    pub fn matching_offenses<'i>(
        &self,
        incident: &'i Incident,
    ) -> impl Iterator<Item = &'i Offense> {
        incident
            .offenses
            .iter()
            .filter(move |offense| self.matches_offense(offense))
    }

    /// Whether `incident` is visible: it passes the incident-scoped
    /// constraints and, under an offense constraint, has at least one
    /// matching offense.
    #[must_use]
    pub fn admits(&self, incident: &Incident, agency: &Agency) -> bool {
        self.matches_incident(incident, agency)
            && (!self.constrains_offenses() || self.matching_offenses(incident).next().is_some())
    }
}
