//! OAuth service descriptors under `<ModulePrefs><OAuth>`.

use std::fmt;

use serde::Serialize;
use url::Url;

use super::coerce;
use super::{display_as_xml, ElementBuilder, ElementData, LeafBuilder, Node, SpecElement};
use crate::error::{GadgetError, Result};
use crate::registry::ParseContext;
use crate::uri;
use crate::xml::{QName, XmlWriter};

/// HTTP method used for an OAuth endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        })
    }
}

/// Where OAuth parameters are placed in a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParamLocation {
    #[default]
    AuthHeader,
    PostBody,
    UriQuery,
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParamLocation::AuthHeader => "auth-header",
            ParamLocation::PostBody => "post-body",
            ParamLocation::UriQuery => "uri-query",
        })
    }
}

/// Which token endpoint a descriptor describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    Request,
    Access,
}

/// The `<OAuth>` element: a set of services with unique names.
#[derive(Debug, Clone, PartialEq)]
pub struct OAuthSpec {
    data: ElementData,
    services: Vec<OAuthService>,
}

impl OAuthSpec {
    pub(crate) fn builder(name: QName) -> Box<dyn ElementBuilder> {
        Box::new(OAuthSpecBuilder {
            data: ElementData::new(name),
            services: Vec::new(),
        })
    }

    #[must_use]
    pub fn services(&self) -> &[OAuthService] {
        &self.services
    }

    #[must_use]
    pub fn service(&self, name: &str) -> Option<&OAuthService> {
        self.services.iter().find(|service| service.name() == name)
    }
}

impl SpecElement for OAuthSpec {
    fn data(&self) -> &ElementData {
        &self.data
    }

    fn write_children(&self, writer: &mut XmlWriter) -> Result<()> {
        for service in &self.services {
            service.write_xml(writer)?;
        }
        Ok(())
    }
}

struct OAuthSpecBuilder {
    data: ElementData,
    services: Vec<OAuthService>,
}

impl ElementBuilder for OAuthSpecBuilder {
    fn data_mut(&mut self) -> &mut ElementData {
        &mut self.data
    }

    fn add_child(&mut self, child: Node) -> Result<()> {
        match child {
            Node::OAuthService(service) => {
                if self.services.iter().any(|s| s.name() == service.name()) {
                    return Err(GadgetError::conflict(
                        self.data.local_name(),
                        format!("duplicate Service@name '{}'", service.name()),
                    ));
                }
                self.services.push(service);
            }
            other => self.data.push_extension(other),
        }
        Ok(())
    }

    fn build(self: Box<Self>, _context: &ParseContext) -> Result<Node> {
        Ok(Node::OAuth(OAuthSpec {
            data: self.data,
            services: self.services,
        }))
    }
}

/// One OAuth `<Service>` with its three endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct OAuthService {
    data: ElementData,
    request: OAuthEndpoint,
    access: OAuthEndpoint,
    authorization: OAuthAuthorization,
}

impl OAuthService {
    pub(crate) fn builder(name: QName) -> Box<dyn ElementBuilder> {
        Box::new(OAuthServiceBuilder {
            data: ElementData::new(name),
            request: None,
            access: None,
            authorization: None,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.data.attribute("name").unwrap_or_default()
    }

    #[must_use]
    pub fn request(&self) -> &OAuthEndpoint {
        &self.request
    }

    #[must_use]
    pub fn access(&self) -> &OAuthEndpoint {
        &self.access
    }

    #[must_use]
    pub fn authorization(&self) -> &OAuthAuthorization {
        &self.authorization
    }
}

impl SpecElement for OAuthService {
    fn data(&self) -> &ElementData {
        &self.data
    }

    fn write_children(&self, writer: &mut XmlWriter) -> Result<()> {
        self.request.write_xml(writer)?;
        self.access.write_xml(writer)?;
        self.authorization.write_xml(writer)
    }
}

struct OAuthServiceBuilder {
    data: ElementData,
    request: Option<OAuthEndpoint>,
    access: Option<OAuthEndpoint>,
    authorization: Option<OAuthAuthorization>,
}

impl ElementBuilder for OAuthServiceBuilder {
    fn data_mut(&mut self) -> &mut ElementData {
        &mut self.data
    }

    fn add_child(&mut self, child: Node) -> Result<()> {
        let element = self.data.local_name();
        match child {
            Node::OAuthEndpoint(endpoint) => {
                let (slot, tag) = match endpoint.kind() {
                    EndpointKind::Request => (&mut self.request, "Request"),
                    EndpointKind::Access => (&mut self.access, "Access"),
                };
                if slot.is_some() {
                    return Err(GadgetError::duplicate(element, tag));
                }
                *slot = Some(endpoint);
            }
            Node::OAuthAuthorization(authorization) => {
                if self.authorization.is_some() {
                    return Err(GadgetError::duplicate(element, "Authorization"));
                }
                self.authorization = Some(authorization);
            }
            other => self.data.push_extension(other),
        }
        Ok(())
    }

    fn build(self: Box<Self>, _context: &ParseContext) -> Result<Node> {
        let this = *self;
        let element = this.data.local_name();
        coerce::required(&this.data, "name")?;
        let request = this
            .request
            .ok_or_else(|| GadgetError::missing_element(element, "Request"))?;
        let access = this
            .access
            .ok_or_else(|| GadgetError::missing_element(element, "Access"))?;
        let authorization = this
            .authorization
            .ok_or_else(|| GadgetError::missing_element(element, "Authorization"))?;

        if request.method() != access.method() {
            return Err(GadgetError::conflict(
                element,
                "access@method is not equal request@method",
            ));
        }
        if request.param_location() != access.param_location() {
            return Err(GadgetError::conflict(
                element,
                "access@param_location is not equal request@param_location",
            ));
        }

        Ok(Node::OAuthService(OAuthService {
            data: this.data,
            request,
            access,
            authorization,
        }))
    }
}

/// A `<Request>` or `<Access>` token endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct OAuthEndpoint {
    data: ElementData,
    kind: EndpointKind,
    url: Url,
    method: HttpMethod,
    param_location: ParamLocation,
}

impl OAuthEndpoint {
    pub(crate) fn request_builder(name: QName) -> Box<dyn ElementBuilder> {
        LeafBuilder::boxed(name, |data, context| {
            OAuthEndpoint::assemble(data, EndpointKind::Request, context.spec_url())
                .map(Node::OAuthEndpoint)
        })
    }

    pub(crate) fn access_builder(name: QName) -> Box<dyn ElementBuilder> {
        LeafBuilder::boxed(name, |data, context| {
            OAuthEndpoint::assemble(data, EndpointKind::Access, context.spec_url())
                .map(Node::OAuthEndpoint)
        })
    }

    fn assemble(data: ElementData, kind: EndpointKind, base: &Url) -> Result<Self> {
        let element = data.local_name();
        let url = resolve_url(&data, base)?;
        let method = coerce::keyword(
            &data,
            "method",
            &[("GET", HttpMethod::Get), ("POST", HttpMethod::Post)],
            HttpMethod::Get,
        )?;
        let param_location = coerce::keyword(
            &data,
            "param_location",
            &[
                ("auth-header", ParamLocation::AuthHeader),
                ("post-body", ParamLocation::PostBody),
                ("uri-query", ParamLocation::UriQuery),
            ],
            ParamLocation::AuthHeader,
        )?;
        if param_location == ParamLocation::PostBody && method != HttpMethod::Post {
            return Err(GadgetError::conflict(
                element,
                "param_location=\"post-body\" requires method=\"POST\"",
            ));
        }
        Ok(Self {
            data,
            kind,
            url,
            method,
            param_location,
        })
    }

    #[must_use]
    pub fn kind(&self) -> EndpointKind {
        self.kind
    }

    /// Endpoint URL resolved against the document URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    #[must_use]
    pub fn param_location(&self) -> ParamLocation {
        self.param_location
    }
}

impl SpecElement for OAuthEndpoint {
    fn data(&self) -> &ElementData {
        &self.data
    }
}

/// The `<Authorization>` endpoint users are sent to.
#[derive(Debug, Clone, PartialEq)]
pub struct OAuthAuthorization {
    data: ElementData,
    url: Url,
}

impl OAuthAuthorization {
    pub(crate) fn builder(name: QName) -> Box<dyn ElementBuilder> {
        LeafBuilder::boxed(name, |data, context| {
            let url = resolve_url(&data, context.spec_url())?;
            Ok(Node::OAuthAuthorization(OAuthAuthorization { data, url }))
        })
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl SpecElement for OAuthAuthorization {
    fn data(&self) -> &ElementData {
        &self.data
    }
}

fn resolve_url(data: &ElementData, base: &Url) -> Result<Url> {
    let raw = coerce::required(data, "url")?;
    uri::resolve(raw, base).map_err(|reason| {
        GadgetError::invalid_value(data.local_name(), "url", raw, format!("a URI ({reason})"))
    })
}

display_as_xml!(OAuthSpec, OAuthService, OAuthEndpoint, OAuthAuthorization);
