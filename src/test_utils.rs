// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses.

use http::{Request, Response};
use http_body_util::BodyExt;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::api::ObjectMeta;
use kube::client::Body;
use kube::Client;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A request seen by the mock, in arrival order
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

/// A mock HTTP service that returns predefined responses based on request paths.
///
/// Unmatched GETs answer 404. Unmatched POST, PUT and PATCH requests echo their body
/// back, which is what the API server does for a successful create, replace or apply.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a response for POST requests matching the exact path
    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    pub fn on_put(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PUT", path, status, body)
    }

    pub fn on_patch(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PATCH", path, status, body)
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "https://kubernetes.default.svc")
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests whose path starts with the given prefix
    pub fn requests_to(&self, prefix: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path.starts_with(prefix))
            .collect()
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        self.responses
            .lock()
            .unwrap()
            .get(&(method.to_string(), path.to_string()))
            .cloned()
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        let response = self.find_response(&method, &path);
        let requests = self.requests.clone();

        Box::pin(async move {
            let bytes = req.into_body().collect().await?.to_bytes();
            let body = String::from_utf8_lossy(&bytes).to_string();
            requests.lock().unwrap().push(RecordedRequest {
                method: method.clone(),
                path,
                body: body.clone(),
            });

            let (status, body) = match (response, method.as_str()) {
                (Some(resp), _) => resp,
                (None, "POST") => (201, body),
                (None, "PUT") | (None, "PATCH") => (200, body),
                (None, _) => (404, not_found_json("resource", "unknown")),
            };

            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a mock namespace JSON response
pub fn namespace_json(name: &str) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {
            "name": name,
            "uid": "test-uid"
        }
    })
    .to_string()
}

/// Create a failure Status response
pub fn status_json(code: u16, reason: &str, message: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    status_json(404, "NotFound", &format!("{} \"{}\" not found", resource, name))
}

pub fn forbidden_json(resource: &str, name: &str) -> String {
    status_json(403, "Forbidden", &format!("{} \"{}\" is forbidden", resource, name))
}

pub fn conflict_json(resource: &str, name: &str) -> String {
    status_json(
        409,
        "Conflict",
        &format!("Operation cannot be fulfilled on {} \"{}\"", resource, name),
    )
}

pub fn access_review_json(allowed: bool) -> String {
    serde_json::json!({
        "apiVersion": "authorization.k8s.io/v1",
        "kind": "SelfSubjectAccessReview",
        "spec": {},
        "status": {
            "allowed": allowed,
            "reason": if allowed { "" } else { "user cannot * * at the cluster scope" }
        }
    })
    .to_string()
}

pub fn self_subject_review_json(username: &str) -> String {
    serde_json::json!({
        "apiVersion": "authentication.k8s.io/v1",
        "kind": "SelfSubjectReview",
        "metadata": {},
        "status": {
            "userInfo": { "username": username, "groups": ["system:authenticated"] }
        }
    })
    .to_string()
}

/// An htpasswd secret holding the given records
pub fn htpasswd_secret_json(namespace: &str, name: &str, contents: &str) -> String {
    let secret = Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            resource_version: Some("4711".to_string()),
            ..Default::default()
        },
        data: Some(BTreeMap::from([(
            "htpasswd".to_string(),
            ByteString(contents.as_bytes().to_vec()),
        )])),
        type_: Some("Opaque".to_string()),
        ..Default::default()
    };
    serde_json::to_string(&secret).unwrap()
}

pub fn cluster_operator_json(name: &str, available: &str, progressing: &str) -> String {
    serde_json::json!({
        "apiVersion": "config.openshift.io/v1",
        "kind": "ClusterOperator",
        "metadata": { "name": name },
        "spec": {},
        "status": {
            "conditions": [
                { "type": "Available", "status": available },
                { "type": "Progressing", "status": progressing },
                { "type": "Degraded", "status": "False" }
            ]
        }
    })
    .to_string()
}

/// The cluster OAuth configuration without identity providers
pub fn oauth_json() -> String {
    serde_json::json!({
        "apiVersion": "config.openshift.io/v1",
        "kind": "OAuth",
        "metadata": { "name": "cluster" },
        "spec": {}
    })
    .to_string()
}

pub fn che_cluster_list_json(che_url: Option<&str>) -> String {
    let status = match che_url {
        Some(url) => serde_json::json!({ "cheURL": url, "chePhase": "Active" }),
        None => serde_json::json!({}),
    };
    serde_json::json!({
        "apiVersion": "org.eclipse.che/v2",
        "kind": "CheClusterList",
        "metadata": {},
        "items": [{
            "apiVersion": "org.eclipse.che/v2",
            "kind": "CheCluster",
            "metadata": { "name": "devspaces", "namespace": "openshift-devspaces" },
            "spec": {},
            "status": status
        }]
    })
    .to_string()
}

/// A DevWorkspace list with one workspace per (name, phase) pair
pub fn dev_workspace_list_json(namespace: &str, workspaces: &[(&str, &str)]) -> String {
    let items: Vec<serde_json::Value> = workspaces
        .iter()
        .map(|(name, phase)| {
            serde_json::json!({
                "apiVersion": "workspace.devfile.io/v1alpha2",
                "kind": "DevWorkspace",
                "metadata": { "name": name, "namespace": namespace },
                "spec": { "started": true },
                "status": {
                    "devworkspaceId": format!("workspace-{}", name),
                    "phase": phase,
                    "mainUrl": format!("https://ide.example.com/{}/{}", namespace, name),
                    "message": if *phase == "Failed" { "container crashed" } else { "" }
                }
            })
        })
        .collect();

    serde_json::json!({
        "apiVersion": "workspace.devfile.io/v1alpha2",
        "kind": "DevWorkspaceList",
        "metadata": {},
        "items": items
    })
    .to_string()
}
