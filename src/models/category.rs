use crate::error::AppError;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// The seventeen UN Sustainable Development Goals
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub enum SdgGoal {
    NoPoverty = 1,
    ZeroHunger,
    GoodHealth,
    QualityEducation,
    GenderEquality,
    CleanWater,
    AffordableEnergy,
    DecentWork,
    Industry,
    ReducedInequality,
    SustainableCities,
    ResponsibleConsumption,
    ClimateAction,
    LifeBelowWater,
    LifeOnLand,
    PeaceAndJustice,
    Partnerships,
}

impl SdgGoal {
    pub fn all() -> &'static [SdgGoal] {
        static ALL: [SdgGoal; 17] = [
            SdgGoal::NoPoverty,
            SdgGoal::ZeroHunger,
            SdgGoal::GoodHealth,
            SdgGoal::QualityEducation,
            SdgGoal::GenderEquality,
            SdgGoal::CleanWater,
            SdgGoal::AffordableEnergy,
            SdgGoal::DecentWork,
            SdgGoal::Industry,
            SdgGoal::ReducedInequality,
            SdgGoal::SustainableCities,
            SdgGoal::ResponsibleConsumption,
            SdgGoal::ClimateAction,
            SdgGoal::LifeBelowWater,
            SdgGoal::LifeOnLand,
            SdgGoal::PeaceAndJustice,
            SdgGoal::Partnerships,
        ];
        &ALL
    }

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::all().get(usize::from(number).checked_sub(1)?).copied()
    }

    pub fn title(self) -> &'static str {
        match self {
            SdgGoal::NoPoverty => "No Poverty",
            SdgGoal::ZeroHunger => "Zero Hunger",
            SdgGoal::GoodHealth => "Good Health and Well-being",
            SdgGoal::QualityEducation => "Quality Education",
            SdgGoal::GenderEquality => "Gender Equality",
            SdgGoal::CleanWater => "Clean Water and Sanitation",
            SdgGoal::AffordableEnergy => "Affordable and Clean Energy",
            SdgGoal::DecentWork => "Decent Work and Economic Growth",
            SdgGoal::Industry => "Industry, Innovation and Infrastructure",
            SdgGoal::ReducedInequality => "Reduced Inequality",
            SdgGoal::SustainableCities => "Sustainable Cities and Communities",
            SdgGoal::ResponsibleConsumption => "Responsible Consumption and Production",
            SdgGoal::ClimateAction => "Climate Action",
            SdgGoal::LifeBelowWater => "Life Below Water",
            SdgGoal::LifeOnLand => "Life on Land",
            SdgGoal::PeaceAndJustice => "Peace, Justice and Strong Institutions",
            SdgGoal::Partnerships => "Partnerships for the Goals",
        }
    }
}

impl TryFrom<u8> for SdgGoal {
    type Error = AppError;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        SdgGoal::from_number(number).ok_or_else(|| {
            AppError::Validation(format!("SDG goal must be between 1 and 17, got {}", number))
        })
    }
}

impl From<SdgGoal> for u8 {
    fn from(goal: SdgGoal) -> Self {
        goal.number()
    }
}

/// Assigns an SDG goal to a page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: Option<i64>,
    pub page_id: i64,
    pub goal: Option<SdgGoal>,
    /// Derived from `goal` on save
    pub category_name: Option<String>,
}

impl Category {
    pub fn new(page_id: i64, goal: Option<SdgGoal>) -> Self {
        Self {
            id: None,
            page_id,
            goal,
            category_name: None,
        }
    }

    /// Refreshes `category_name` from the goal. A category without a goal
    /// keeps whatever name it had.
    pub fn derive_name(&mut self) {
        if let Some(goal) = self.goal {
            self.category_name = Some(goal.title().to_string());
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let number = self
            .goal
            .map(|g| g.number().to_string())
            .unwrap_or_else(|| "None".to_string());
        write!(
            f,
            "Goal {}: {}",
            number,
            self.category_name.as_deref().unwrap_or("Unknown")
        )
    }
}

impl<'r> TryFrom<&Row<'r>> for Category {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'r>) -> Result<Self, Self::Error> {
        let goal_number: Option<u8> = row.get(2)?;
        Ok(Category {
            id: Some(row.get(0)?),
            page_id: row.get(1)?,
            goal: goal_number.and_then(SdgGoal::from_number),
            category_name: row.get(3)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_numbers_line_up() {
        for (i, goal) in SdgGoal::all().iter().enumerate() {
            assert_eq!(goal.number() as usize, i + 1);
            assert_eq!(SdgGoal::from_number(goal.number()), Some(*goal));
        }
        assert_eq!(SdgGoal::from_number(0), None);
        assert_eq!(SdgGoal::from_number(18), None);
        assert_eq!(SdgGoal::ClimateAction.number(), 13);
        assert_eq!(SdgGoal::Partnerships.title(), "Partnerships for the Goals");
    }

    #[test]
    fn test_derive_name() {
        let mut category = Category::new(1, Some(SdgGoal::QualityEducation));
        category.derive_name();
        assert_eq!(category.category_name.as_deref(), Some("Quality Education"));
        assert_eq!(category.to_string(), "Goal 4: Quality Education");

        let category = Category::new(1, None);
        assert_eq!(category.to_string(), "Goal None: Unknown");
    }

    #[test]
    fn test_serde_uses_goal_number() {
        let json = serde_json::to_string(&SdgGoal::LifeOnLand).unwrap();
        assert_eq!(json, "15");
        let goal: SdgGoal = serde_json::from_str("2").unwrap();
        assert_eq!(goal, SdgGoal::ZeroHunger);
        assert!(serde_json::from_str::<SdgGoal>("42").is_err());
    }
}
