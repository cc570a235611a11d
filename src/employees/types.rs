use serde::{Deserialize, Serialize};

pub type EmployeeId = String;

/// Text fields of an employee that feed the reverse index.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeField {
    Name,
    Surname,
    Patronymic,
    Role,
    Email,
    Birthday,
    TelegramId,
    VkId,
    Team,
    Phones,
}

impl EmployeeField {
    pub const ALL: [EmployeeField; 10] = [
        EmployeeField::Name,
        EmployeeField::Surname,
        EmployeeField::Patronymic,
        EmployeeField::Role,
        EmployeeField::Email,
        EmployeeField::Birthday,
        EmployeeField::TelegramId,
        EmployeeField::VkId,
        EmployeeField::Team,
        EmployeeField::Phones,
    ];

    /// Column name in the `employees` table.
    pub fn column(&self) -> &'static str {
        match self {
            EmployeeField::Name => "name",
            EmployeeField::Surname => "surname",
            EmployeeField::Patronymic => "patronymic",
            EmployeeField::Role => "role",
            EmployeeField::Email => "email",
            EmployeeField::Birthday => "birthday",
            EmployeeField::TelegramId => "telegram_id",
            EmployeeField::VkId => "vk_id",
            EmployeeField::Team => "team",
            EmployeeField::Phones => "phones",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub surname: String,
    #[serde(default)]
    pub patronymic: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub telegram_id: Option<String>,
    #[serde(default)]
    pub vk_id: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub phones: Vec<String>,
    #[serde(default)]
    pub photo_link: Option<String>,
}

impl Employee {
    pub fn new(id: &str, name: &str, surname: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            surname: surname.to_string(),
            patronymic: None,
            role: None,
            email: None,
            birthday: None,
            telegram_id: None,
            vk_id: None,
            team: None,
            phones: Vec::new(),
            photo_link: None,
        }
    }

    /// Non-null values of the given fields, phones expanded one value per number.
    pub fn values_of(&self, fields: &[EmployeeField]) -> Vec<String> {
        let mut values = Vec::new();
        for field in fields {
            match field {
                EmployeeField::Name => values.push(self.name.clone()),
                EmployeeField::Surname => values.push(self.surname.clone()),
                EmployeeField::Patronymic => values.extend(self.patronymic.clone()),
                EmployeeField::Role => values.extend(self.role.clone()),
                EmployeeField::Email => values.extend(self.email.clone()),
                EmployeeField::Birthday => values.extend(self.birthday.clone()),
                EmployeeField::TelegramId => values.extend(self.telegram_id.clone()),
                EmployeeField::VkId => values.extend(self.vk_id.clone()),
                EmployeeField::Team => values.extend(self.team.clone()),
                EmployeeField::Phones => values.extend(self.phones.iter().cloned()),
            }
        }
        values
    }

    pub fn indexable_values(&self) -> Vec<String> {
        self.values_of(&EmployeeField::ALL)
    }

    pub fn summary(&self) -> EmployeeSummary {
        EmployeeSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            surname: self.surname.clone(),
            patronymic: self.patronymic.clone(),
            photo_link: self.photo_link.clone(),
        }
    }
}

/// Partial update of an employee. A `Some` field is a changed field; `None` leaves the
/// stored value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EmployeePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub patronymic: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub telegram_id: Option<String>,
    #[serde(default)]
    pub vk_id: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub phones: Option<Vec<String>>,
}

impl EmployeePatch {
    pub fn changed_fields(&self) -> Vec<EmployeeField> {
        EmployeeField::ALL
            .into_iter()
            .filter(|field| match field {
                EmployeeField::Name => self.name.is_some(),
                EmployeeField::Surname => self.surname.is_some(),
                EmployeeField::Patronymic => self.patronymic.is_some(),
                EmployeeField::Role => self.role.is_some(),
                EmployeeField::Email => self.email.is_some(),
                EmployeeField::Birthday => self.birthday.is_some(),
                EmployeeField::TelegramId => self.telegram_id.is_some(),
                EmployeeField::VkId => self.vk_id.is_some(),
                EmployeeField::Team => self.team.is_some(),
                EmployeeField::Phones => self.phones.is_some(),
            })
            .collect()
    }

    /// New values carried by the patch, in `EmployeeField::ALL` order.
    pub fn values(&self) -> Vec<String> {
        let scalars = [
            &self.name,
            &self.surname,
            &self.patronymic,
            &self.role,
            &self.email,
            &self.birthday,
            &self.telegram_id,
            &self.vk_id,
            &self.team,
        ];

        let mut values: Vec<String> = scalars.into_iter().flatten().cloned().collect();
        if let Some(phones) = &self.phones {
            values.extend(phones.iter().cloned());
        }
        values
    }

    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }

    pub fn apply_to(&self, employee: &mut Employee) {
        if let Some(name) = &self.name {
            employee.name = name.clone();
        }
        if let Some(surname) = &self.surname {
            employee.surname = surname.clone();
        }
        if let Some(patronymic) = &self.patronymic {
            employee.patronymic = Some(patronymic.clone());
        }
        if let Some(role) = &self.role {
            employee.role = Some(role.clone());
        }
        if let Some(email) = &self.email {
            employee.email = Some(email.clone());
        }
        if let Some(birthday) = &self.birthday {
            employee.birthday = Some(birthday.clone());
        }
        if let Some(telegram_id) = &self.telegram_id {
            employee.telegram_id = Some(telegram_id.clone());
        }
        if let Some(vk_id) = &self.vk_id {
            employee.vk_id = Some(vk_id.clone());
        }
        if let Some(team) = &self.team {
            employee.team = Some(team.clone());
        }
        if let Some(phones) = &self.phones {
            employee.phones = phones.clone();
        }
    }
}

/// The item shape of every search response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmployeeSummary {
    pub id: EmployeeId,
    pub name: String,
    pub surname: String,
    pub patronymic: Option<String>,
    pub photo_link: Option<String>,
}
