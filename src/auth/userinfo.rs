use serde_json::Value;

use crate::auth::{principal::UserInfo, provider::Provider};

/// Normalizes a provider userinfo document into the common [`UserInfo`]
/// shape. The layouts differ: google is flat, naver wraps everything in a
/// `response` envelope, kakao splits attributes between `kakao_account` and
/// the legacy `properties` map.
pub fn normalize(provider: Provider, access_token: String, raw: &Value) -> anyhow::Result<UserInfo> {
    match provider {
        Provider::Google => {
            let subject = raw["sub"]
                .as_str()
                .ok_or_else(|| anyhow::anyhow!("google userinfo missing sub"))?
                .to_string();
            Ok(UserInfo {
                provider,
                subject,
                email: str_field(raw, "email"),
                name: str_field(raw, "name"),
                nickname: str_field(raw, "given_name"),
                access_token,
            })
        }
        Provider::Naver => {
            let body = &raw["response"];
            let subject = body["id"]
                .as_str()
                .ok_or_else(|| anyhow::anyhow!("naver userinfo missing response.id"))?
                .to_string();
            Ok(UserInfo {
                provider,
                subject,
                email: str_field(body, "email"),
                name: str_field(body, "name"),
                nickname: str_field(body, "nickname"),
                access_token,
            })
        }
        Provider::Kakao => {
            let subject = raw["id"]
                .as_i64()
                .map(|id| id.to_string())
                .or_else(|| raw["id"].as_str().map(str::to_string))
                .ok_or_else(|| anyhow::anyhow!("kakao userinfo missing id"))?;
            let account = &raw["kakao_account"];
            let nickname = account["profile"]["nickname"]
                .as_str()
                .or_else(|| raw["properties"]["nickname"].as_str())
                .map(str::to_string);
            Ok(UserInfo {
                provider,
                subject,
                email: str_field(account, "email"),
                // Kakao exposes no real-name field at this consent level.
                name: nickname.clone(),
                nickname,
                access_token,
            })
        }
    }
}

fn str_field(v: &Value, key: &str) -> Option<String> {
    v[key].as_str().map(str::to_string)
}
