//! Paths the admin understands and the login guard in front of them

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Root,
    Login,
    Dashboard,
    Category(i64),
    Product(i64),
}

impl Route {
    /// Whether the route needs a logged in user
    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Dashboard | Route::Category(_) | Route::Product(_))
    }

    pub fn path(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Root => write!(f, "/"),
            Route::Login => write!(f, "/login"),
            Route::Dashboard => write!(f, "/dashboard"),
            Route::Category(id) => write!(f, "/category/{}", id),
            Route::Product(id) => write!(f, "/product/{}", id),
        }
    }
}

/// Error for paths that match no route
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no route matches {0}")]
pub struct UnknownRoute(pub String);

impl FromStr for Route {
    type Err = UnknownRoute;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').skip(1).collect();

        let route = match segments.as_slice() {
            [] => Some(Route::Root),
            ["login"] => Some(Route::Login),
            ["dashboard"] => Some(Route::Dashboard),
            ["category", id] => id.parse().ok().map(Route::Category),
            ["product", id] => id.parse().ok().map(Route::Product),
            _ => None,
        };

        if !path.starts_with('/') {
            return Err(UnknownRoute(path.to_string()));
        }
        route.ok_or_else(|| UnknownRoute(path.to_string()))
    }
}

/// Where a request for `path` ends up.
///
/// `/` sends users to the dashboard or the login page, logged in users are
/// kept away from `/login`, protected routes require a login and anything
/// unknown goes back to `/`, which then resolves again.
pub fn resolve(path: &str, authenticated: bool) -> Route {
    let route = path.parse::<Route>().unwrap_or(Route::Root);
    match route {
        Route::Root if authenticated => Route::Dashboard,
        Route::Root => Route::Login,
        Route::Login if authenticated => Route::Dashboard,
        r if r.is_protected() && !authenticated => Route::Login,
        r => r,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_paths() {
        assert_eq!("/".parse::<Route>(), Ok(Route::Root));
        assert_eq!("/login".parse::<Route>(), Ok(Route::Login));
        assert_eq!("/dashboard/".parse::<Route>(), Ok(Route::Dashboard));
        assert_eq!("/category/3".parse::<Route>(), Ok(Route::Category(3)));
        assert_eq!("/product/12?tab=1".parse::<Route>(), Ok(Route::Product(12)));
        assert!("/category/abc".parse::<Route>().is_err());
        assert!("/settings".parse::<Route>().is_err());
        assert!("dashboard".parse::<Route>().is_err());
    }

    #[test]
    fn unknown_route_error_names_the_path() {
        let err = "/settings".parse::<Route>().unwrap_err();
        assert_eq!(err, UnknownRoute("/settings".to_string()));
        assert_eq!(err.to_string(), "no route matches /settings");

        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert!(boxed.source().is_none());
    }

    #[test]
    fn paths_round_trip_through_display() {
        for route in [Route::Login, Route::Dashboard, Route::Category(7), Route::Product(9)] {
            assert_eq!(route.path().parse::<Route>(), Ok(route));
        }
    }

    #[test]
    fn guard_redirects() {
        assert_eq!(resolve("/", true), Route::Dashboard);
        assert_eq!(resolve("/", false), Route::Login);
        assert_eq!(resolve("/login", true), Route::Dashboard);
        assert_eq!(resolve("/login", false), Route::Login);
        assert_eq!(resolve("/category/3", false), Route::Login);
        assert_eq!(resolve("/category/3", true), Route::Category(3));
        assert_eq!(resolve("/product/4", false), Route::Login);
        assert_eq!(resolve("/nowhere", true), Route::Dashboard);
        assert_eq!(resolve("/nowhere", false), Route::Login);
    }
}
