//! Blocking REST client for the hosting platform.
//!
//! [`HttpPlatform`] implements [`Platform`] on top of a `ureq` agent.  Every
//! method is one request; nothing is retried.  The site list is held in
//! memory after the first fetch and only refreshed by
//! [`Platform::rebuild_cache`].
//!
//! # Endpoints
//!
//! | Capability        | Request                                                  |
//! |-------------------|----------------------------------------------------------|
//! | current user      | `GET  /session`                                          |
//! | site list         | `GET  /users/{user}/sites`                               |
//! | environments      | `GET  /sites/{site}/environments`                        |
//! | diffstat          | `GET  /sites/{site}/environments/{env}/diffstat`         |
//! | commit            | `POST /sites/{site}/environments/{env}/commit`           |
//! | create backup     | `POST /sites/{site}/environments/{env}/backups`          |

use std::{
    cell::{OnceCell, RefCell},
    time::Duration,
};

use serde::{Deserialize, de::DeserializeOwned};
use serde_json::json;
use tracing::debug;

use crate::{
    config::PlatformConfig,
    error::PlatformError,
    options::Element,
    platform::{Diffstat, Environment, Platform, Site, Workflow},
};

#[derive(Debug, Deserialize)]
struct SessionResponse {
    user_id: String,
}

pub struct HttpPlatform {
    agent: ureq::Agent,
    base_url: String,
    token: String,
    user_id: OnceCell<String>,
    sites: RefCell<Option<Vec<Site>>>,
}

impl HttpPlatform {
    /// Build a client from `[platform]` settings.
    ///
    /// Fails without sending anything when the URL or token is missing, or
    /// when the timeout is zero.
    pub fn new(cfg: &PlatformConfig) -> Result<Self, PlatformError> {
        let base_url = cfg
            .url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or(PlatformError::MissingUrl)?;
        let token = cfg
            .token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(PlatformError::MissingToken)?;
        if cfg.timeout_secs == 0 {
            return Err(PlatformError::ZeroTimeout);
        }

        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .user_agent(concat!("sites-backup/", env!("CARGO_PKG_VERSION")))
            .build();

        Ok(Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            user_id: OnceCell::new(),
            sites: RefCell::new(None),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, PlatformError> {
        let url = self.url(path);
        debug!(%url, "GET");
        let request = self
            .agent
            .get(&url)
            .set("Authorization", &format!("Bearer {}", self.token));
        decode(&url, request.call().map_err(|e| request_error("GET", &url, e))?)
    }

    fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, PlatformError> {
        let url = self.url(path);
        debug!(%url, "POST");
        let request = self
            .agent
            .post(&url)
            .set("Authorization", &format!("Bearer {}", self.token));
        decode(
            &url,
            request
                .send_json(body)
                .map_err(|e| request_error("POST", &url, e))?,
        )
    }

    fn fetch_sites(&self) -> Result<Vec<Site>, PlatformError> {
        let user = self.current_user_id()?;
        self.get(&format!("/users/{user}/sites"))
    }
}

fn env_path(site: &Site, env: &Environment) -> String {
    format!("/sites/{}/environments/{}", site.id, env.id)
}

fn decode<T: DeserializeOwned>(url: &str, response: ureq::Response) -> Result<T, PlatformError> {
    response.into_json().map_err(|source| PlatformError::Decode {
        url: url.to_string(),
        source,
    })
}

fn request_error(method: &'static str, url: &str, err: ureq::Error) -> PlatformError {
    match err {
        ureq::Error::Status(status, response) => PlatformError::Status {
            method,
            url: url.to_string(),
            status,
            body: response.into_string().unwrap_or_default(),
        },
        ureq::Error::Transport(transport) => PlatformError::Transport {
            method,
            url: url.to_string(),
            message: transport.to_string(),
        },
    }
}

impl Platform for HttpPlatform {
    fn current_user_id(&self) -> Result<String, PlatformError> {
        if let Some(id) = self.user_id.get() {
            return Ok(id.clone());
        }
        let session: SessionResponse = self.get("/session")?;
        Ok(self.user_id.get_or_init(|| session.user_id).clone())
    }

    fn rebuild_cache(&self) -> Result<(), PlatformError> {
        let sites = self.fetch_sites()?;
        debug!(count = sites.len(), "site list refreshed");
        *self.sites.borrow_mut() = Some(sites);
        Ok(())
    }

    fn sites(&self) -> Result<Vec<Site>, PlatformError> {
        if let Some(sites) = self.sites.borrow().as_ref() {
            return Ok(sites.clone());
        }
        let sites = self.fetch_sites()?;
        *self.sites.borrow_mut() = Some(sites.clone());
        Ok(sites)
    }

    fn environments(&self, site: &Site) -> Result<Vec<Environment>, PlatformError> {
        self.get(&format!("/sites/{}/environments", site.id))
            .map_err(|e| match e {
                PlatformError::Status { status: 404, .. } => {
                    PlatformError::SiteNotFound(site.name.clone())
                },
                other => other,
            })
    }

    fn diffstat(&self, site: &Site, env: &Environment) -> Result<Diffstat, PlatformError> {
        self.get(&format!("{}/diffstat", env_path(site, env)))
    }

    fn commit(
        &self,
        site: &Site,
        env: &Environment,
        message: &str,
    ) -> Result<Workflow, PlatformError> {
        self.post(
            &format!("{}/commit", env_path(site, env)),
            json!({ "message": message }),
        )
    }

    fn create_backup(
        &self,
        site: &Site,
        env: &Environment,
        element: Element,
    ) -> Result<Workflow, PlatformError> {
        self.post(
            &format!("{}/backups", env_path(site, env)),
            json!({ "element": element.as_str() }),
        )
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
