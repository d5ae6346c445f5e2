use strum::{AsRefStr, EnumString};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    // 不明なロール文字列は user として扱う
    pub fn from_text(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}
