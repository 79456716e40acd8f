//! Engine options and conventional defaults
//!
//! [`WardingOptions`] is the programmatic configuration of the engine. The
//! serializable core (slugs, tags, labels, root credentials, mute switch)
//! merges over the conventional defaults with RFC 7386 semantics; extra
//! fields and synopsis features carry code and attach through builders.

pub mod merge;

use crate::domain::feature::Synopsis;
use crate::domain::label::{Label, LabelMap, Labels};
use crate::domain::resource::FieldConfig;
use crate::domain::role::Spec;
use crate::error::Result;
use crate::policy::{self, Access, Expectation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Shape of a synthesized resource: its slug and display tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceOptions {
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<Labels>,
}

/// Credentials of the root user created at initialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootCredentials {
    pub email: String,
    pub password: String,
}

/// The full engine options.
#[derive(Clone, Serialize, Deserialize)]
pub struct WardingOptions {
    /// Root user credentials. Without them the root user is not created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<RootCredentials>,
    pub user: ResourceOptions,
    pub role: ResourceOptions,
    /// Labels of engine-introduced fields, rules and verbs.
    #[serde(default)]
    pub label: LabelMap,
    /// Disable the engine without uninstalling it.
    #[serde(default)]
    pub mute: bool,
    /// Extra fields of the synthesized user resource.
    #[serde(skip)]
    pub user_fields: Vec<FieldConfig>,
    /// Extra fields of the synthesized role resource.
    #[serde(skip)]
    pub role_fields: Vec<FieldConfig>,
    /// Manually declared features.
    #[serde(skip)]
    pub ext: Vec<Synopsis>,
    /// Modifies the built result before warding applies.
    #[serde(skip)]
    pub transform: Option<BuiltTransform>,
}

/// A host-supplied transform of the build result.
pub type BuiltTransform =
    std::sync::Arc<dyn Fn(crate::provision::Built) -> crate::provision::Built + Send + Sync>;

impl WardingOptions {
    /// The user/role slug pair the access checker consumes.
    pub fn spec(&self) -> Spec {
        Spec {
            user: self.user.slug.clone(),
            role: self.role.slug.clone(),
        }
    }

    pub fn with_user_fields(mut self, fields: Vec<FieldConfig>) -> Self {
        self.user_fields = fields;
        self
    }

    pub fn with_role_fields(mut self, fields: Vec<FieldConfig>) -> Self {
        self.role_fields = fields;
        self
    }

    pub fn with_ext(mut self, ext: Vec<Synopsis>) -> Self {
        self.ext = ext;
        self
    }
}

fn bilingual(en: &str, zh: &str) -> Label {
    let mut map = BTreeMap::new();
    map.insert("en".to_string(), en.to_string());
    map.insert("zh".to_string(), zh.to_string());
    Label::Localized(map)
}

/// The conventional defaults.
pub fn defaults() -> WardingOptions {
    let mut label = LabelMap::new();
    label.insert("active".to_string(), bilingual("Active Flag", "生效标记"));
    label.insert("features".to_string(), bilingual("Features", "功能"));
    label.insert("feature".to_string(), bilingual("Feature", "功能"));
    label.insert("verbs".to_string(), bilingual("Verbs", "谓词"));
    label.insert("traits".to_string(), bilingual("Traits", "特征"));
    label.insert("roleName".to_string(), bilingual("Role Name", "角色名"));
    label.insert("<admin>".to_string(), bilingual("< Admin Panel >", "< 管理面板 >"));
    label.insert("<unlock>".to_string(), bilingual("< Unlock >", "< 解锁用户 >"));
    label.insert("create".to_string(), bilingual("Create", "新增"));
    label.insert("read".to_string(), bilingual("Read", "读取"));
    label.insert("update".to_string(), bilingual("Update", "更新"));
    label.insert("delete".to_string(), bilingual("Delete", "删除"));

    WardingOptions {
        root: None,
        user: ResourceOptions {
            slug: "user".to_string(),
            tag: Some(Labels {
                singular: Some(bilingual("User", "用户")),
                plural: None,
            }),
        },
        role: ResourceOptions {
            slug: "role".to_string(),
            tag: Some(Labels {
                singular: Some(bilingual("Role", "角色")),
                plural: None,
            }),
        },
        label,
        mute: false,
        user_fields: Vec::new(),
        role_fields: Vec::new(),
        ext: Vec::new(),
        transform: None,
    }
}

/// Produces conventional options with the given overrides merged on top.
pub fn opts(overrides: Value) -> Result<WardingOptions> {
    let mut base = serde_json::to_value(defaults())?;
    merge::merge(&mut base, &overrides);
    Ok(serde_json::from_value(base)?)
}

/// A conventional variant of [`policy::check`] with the default user and
/// role slugs.
pub fn check(ex: Expectation) -> Access {
    let defaults = defaults();
    policy::check(ex, defaults.spec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_spec() {
        let spec = defaults().spec();
        assert_eq!(spec.user, "user");
        assert_eq!(spec.role, "role");
    }

    #[test]
    fn test_opts_merges_overrides() {
        let options = opts(json!({
            "user": {"slug": "member"},
            "root": {"email": "root@example.com", "password": "secret"},
        }))
        .unwrap();

        assert_eq!(options.user.slug, "member");
        // untouched defaults survive the merge
        assert_eq!(options.role.slug, "role");
        assert!(options.user.tag.is_some());
        assert_eq!(options.root.unwrap().email, "root@example.com");
    }

    #[test]
    fn test_opts_null_deletes_default() {
        let options = opts(json!({"user": {"tag": null}})).unwrap();
        assert!(options.user.tag.is_none());
    }

    #[test]
    fn test_opts_overrides_label_entry() {
        let options = opts(json!({"label": {"<admin>": "Panel"}})).unwrap();
        assert_eq!(options.label.get("<admin>"), Some(&Label::plain("Panel")));
        // sibling label entries keep their defaults
        assert!(options.label.contains_key("<unlock>"));
    }

    #[test]
    fn test_convention_check_uses_default_slugs() {
        use crate::domain::role::{RecordId, Requester};
        use crate::domain::verb::Verb;
        use crate::policy::AccessContext;

        let requester = Requester {
            id: RecordId::from("u1"),
            active: true,
            roles: vec![],
        };
        let id = RecordId::from("u1");
        let ck = check(Expectation::feature("user").with_verbs([Verb::Read]));
        let ctx = AccessContext {
            requester: Some(&requester),
            id: Some(&id),
            resource: Some("user"),
            path: "/users/u1",
        };
        assert!(ck(&ctx));
    }
}
