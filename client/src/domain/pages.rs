//! Protected screens of the remisería administration client.

use super::role::Role;

/// A protected page and the roles allowed to see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Route path.
    pub path: &'static str,
    /// Human-readable title.
    pub title: &'static str,
    /// Roles allowed to render the page.
    pub required: &'static [Role],
}

const ADMIN_ONLY: &[Role] = &[Role::Admin];
const DUENIO_ONLY: &[Role] = &[Role::Duenio];
const DISPATCH: &[Role] = &[Role::Duenio, Role::Coordinador];

/// Every protected page, grouped by area.
pub const PAGES: &[Page] = &[
    Page {
        path: "/admin",
        title: "Panel de administración",
        required: ADMIN_ONLY,
    },
    Page {
        path: "/admin/duenios",
        title: "Dueños",
        required: ADMIN_ONLY,
    },
    Page {
        path: "/duenio",
        title: "Panel del dueño",
        required: DUENIO_ONLY,
    },
    Page {
        path: "/duenio/vehiculos",
        title: "Vehículos",
        required: DUENIO_ONLY,
    },
    Page {
        path: "/duenio/choferes",
        title: "Choferes",
        required: DUENIO_ONLY,
    },
    Page {
        path: "/duenio/coordinadores",
        title: "Coordinadores",
        required: DUENIO_ONLY,
    },
    Page {
        path: "/duenio/perfil",
        title: "Perfil",
        required: DUENIO_ONLY,
    },
    Page {
        path: "/duenio/viajes",
        title: "Viajes",
        required: DISPATCH,
    },
    Page {
        path: "/coordinador",
        title: "Tablero de viajes",
        required: &[Role::Coordinador],
    },
];

/// Find the page registered at `path`, ignoring a trailing slash.
pub fn find_page(path: &str) -> Option<&'static Page> {
    let normalized = match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    };
    PAGES.iter().find(|page| page.path == normalized)
}

/// Pages an identity with `role` may open.
pub fn pages_for(role: Role) -> impl Iterator<Item = &'static Page> {
    PAGES
        .iter()
        .filter(move |page| page.required.contains(&role))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/admin", Some("/admin"))]
    #[case("/duenio/vehiculos/", Some("/duenio/vehiculos"))]
    #[case("/desconocida", None)]
    #[case("/", None)]
    fn finds_pages_by_path(#[case] path: &str, #[case] expected: Option<&str>) {
        assert_eq!(find_page(path).map(|page| page.path), expected);
    }

    #[test]
    fn every_role_home_is_a_page_it_can_open_or_the_login_route() {
        for role in Role::ALL {
            let home = role.home_route();
            if home == crate::domain::LOGIN_ROUTE {
                continue;
            }
            let page = find_page(home).expect("home page registered");
            assert!(page.required.contains(&role), "{role} cannot open {home}");
        }
    }

    #[test]
    fn clients_have_no_pages() {
        assert_eq!(pages_for(Role::Cliente).count(), 0);
    }

    #[test]
    fn trips_are_shared_by_owners_and_coordinators() {
        let trips = find_page("/duenio/viajes").expect("trips page");
        assert_eq!(trips.required, &[Role::Duenio, Role::Coordinador]);
    }
}
