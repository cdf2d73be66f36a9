use serde::Serialize;

use crate::error::AppError;

/// Maximum length of a city or point-of-interest name.
pub const MAX_NAME_LEN: usize = 50;

/// Maximum length of a city or point-of-interest description.
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// A city together with the points of interest it owns.
///
/// `points_of_interest` is ordered by id and is left empty when a store is
/// asked not to load the nested collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct City {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub points_of_interest: Vec<PointOfInterest>,
}

/// A named location owned by exactly one city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointOfInterest {
    pub id: i32,
    pub city_id: i32,
    pub name: String,
    pub description: Option<String>,
}

impl City {
    pub fn new(id: i32, name: impl Into<String>, description: Option<&str>) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.map(str::to_string),
            points_of_interest: Vec::new(),
        }
    }

    /// Attach a point of interest, fixing up its back-reference to this city.
    pub fn with_point_of_interest(
        mut self,
        id: i32,
        name: impl Into<String>,
        description: Option<&str>,
    ) -> Self {
        self.points_of_interest.push(PointOfInterest {
            id,
            city_id: self.id,
            name: name.into(),
            description: description.map(str::to_string),
        });
        self
    }

    /// Copy of this city without its nested collection.
    pub fn without_points_of_interest(&self) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            points_of_interest: Vec::new(),
        }
    }

    /// Check the length bounds of this city and every point of interest it owns.
    pub fn validate(&self) -> Result<(), AppError> {
        check_name("city", self.id, &self.name)?;
        check_description("city", self.id, self.description.as_deref())?;
        for poi in &self.points_of_interest {
            if poi.city_id != self.id {
                return Err(AppError::InvalidData(format!(
                    "point of interest {} belongs to city {}, not {}",
                    poi.id, poi.city_id, self.id
                )));
            }
            check_name("point of interest", poi.id, &poi.name)?;
            check_description("point of interest", poi.id, poi.description.as_deref())?;
        }
        Ok(())
    }
}

fn check_name(kind: &str, id: i32, name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::InvalidData(format!("{kind} {id} has an empty name")));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::InvalidData(format!(
            "{kind} {id} name exceeds {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

fn check_description(kind: &str, id: i32, description: Option<&str>) -> Result<(), AppError> {
    match description {
        Some(d) if d.chars().count() > MAX_DESCRIPTION_LEN => Err(AppError::InvalidData(format!(
            "{kind} {id} description exceeds {MAX_DESCRIPTION_LEN} characters"
        ))),
        _ => Ok(()),
    }
}

/// Identity established at login and embedded into the issued token.
///
/// Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub city: String,
}
