//! REST paths for both API surfaces

pub mod application {
    pub mod users {
        pub fn main() -> String {
            "/api/application/users".to_string()
        }
        pub fn get(id: i64) -> String {
            format!("/api/application/users/{}", id)
        }
        pub fn external(id: &str) -> String {
            format!(
                "/api/application/users/external/{}",
                crate::http::encode_component(id)
            )
        }
    }

    pub mod nodes {
        pub fn main() -> String {
            "/api/application/nodes".to_string()
        }
        pub fn get(id: i64) -> String {
            format!("/api/application/nodes/{}", id)
        }
        pub fn config(id: i64) -> String {
            format!("/api/application/nodes/{}/configuration", id)
        }
    }

    pub mod allocations {
        pub fn main(node: i64) -> String {
            format!("/api/application/nodes/{}/allocations", node)
        }
        pub fn get(node: i64, id: i64) -> String {
            format!("/api/application/nodes/{}/allocations/{}", node, id)
        }
    }

    pub mod servers {
        pub fn main() -> String {
            "/api/application/servers".to_string()
        }
        pub fn get(id: i64) -> String {
            format!("/api/application/servers/{}", id)
        }
        pub fn external(id: &str) -> String {
            format!(
                "/api/application/servers/external/{}",
                crate::http::encode_component(id)
            )
        }
        pub fn details(id: i64) -> String {
            format!("/api/application/servers/{}/details", id)
        }
        pub fn build(id: i64) -> String {
            format!("/api/application/servers/{}/build", id)
        }
        pub fn startup(id: i64) -> String {
            format!("/api/application/servers/{}/startup", id)
        }
        pub fn suspend(id: i64) -> String {
            format!("/api/application/servers/{}/suspend", id)
        }
        pub fn unsuspend(id: i64) -> String {
            format!("/api/application/servers/{}/unsuspend", id)
        }
        pub fn reinstall(id: i64) -> String {
            format!("/api/application/servers/{}/reinstall", id)
        }
        pub fn force(id: i64) -> String {
            format!("/api/application/servers/{}/force", id)
        }
    }

    pub mod locations {
        pub fn main() -> String {
            "/api/application/locations".to_string()
        }
        pub fn get(id: i64) -> String {
            format!("/api/application/locations/{}", id)
        }
    }

    pub mod nests {
        pub fn main() -> String {
            "/api/application/nests".to_string()
        }
        pub fn get(id: i64) -> String {
            format!("/api/application/nests/{}", id)
        }

        pub mod eggs {
            pub fn main(nest: i64) -> String {
                format!("/api/application/nests/{}/eggs", nest)
            }
            pub fn get(nest: i64, id: i64) -> String {
                format!("/api/application/nests/{}/eggs/{}", nest, id)
            }
        }
    }
}

pub mod client {
    pub fn main() -> String {
        "/api/client".to_string()
    }

    pub fn permissions() -> String {
        "/api/client/permissions".to_string()
    }

    pub mod account {
        pub fn main() -> String {
            "/api/client/account".to_string()
        }
        pub fn two_factor() -> String {
            "/api/client/account/two-factor".to_string()
        }
        pub fn email() -> String {
            "/api/client/account/email".to_string()
        }
        pub fn password() -> String {
            "/api/client/account/password".to_string()
        }
        pub fn activity() -> String {
            "/api/client/account/activity".to_string()
        }
        pub fn api_keys() -> String {
            "/api/client/account/api-keys".to_string()
        }
        pub fn api_key(id: &str) -> String {
            format!("/api/client/account/api-keys/{}", id)
        }
        pub fn ssh_keys() -> String {
            "/api/client/account/ssh-keys".to_string()
        }
        pub fn ssh_keys_remove() -> String {
            "/api/client/account/ssh-keys/remove".to_string()
        }
    }

    pub mod servers {
        pub fn get(id: &str) -> String {
            format!("/api/client/servers/{}", id)
        }
        pub fn websocket(id: &str) -> String {
            format!("/api/client/servers/{}/websocket", id)
        }
        pub fn resources(id: &str) -> String {
            format!("/api/client/servers/{}/resources", id)
        }
        pub fn activity(id: &str) -> String {
            format!("/api/client/servers/{}/activity", id)
        }
        pub fn command(id: &str) -> String {
            format!("/api/client/servers/{}/command", id)
        }
        pub fn power(id: &str) -> String {
            format!("/api/client/servers/{}/power", id)
        }

        pub mod settings {
            pub fn rename(id: &str) -> String {
                format!("/api/client/servers/{}/settings/rename", id)
            }
            pub fn reinstall(id: &str) -> String {
                format!("/api/client/servers/{}/settings/reinstall", id)
            }
        }

        pub mod files {
            use crate::http::encode_component;

            pub fn list(id: &str, directory: Option<&str>) -> String {
                match directory {
                    Some(dir) => format!(
                        "/api/client/servers/{}/files/list?directory={}",
                        id,
                        encode_component(dir)
                    ),
                    None => format!("/api/client/servers/{}/files/list", id),
                }
            }
            pub fn contents(id: &str, file: &str) -> String {
                format!(
                    "/api/client/servers/{}/files/contents?file={}",
                    id,
                    encode_component(file)
                )
            }
            pub fn download(id: &str, file: &str) -> String {
                format!(
                    "/api/client/servers/{}/files/download?file={}",
                    id,
                    encode_component(file)
                )
            }
            pub fn write(id: &str, file: &str) -> String {
                format!(
                    "/api/client/servers/{}/files/write?file={}",
                    id,
                    encode_component(file)
                )
            }
            pub fn rename(id: &str) -> String {
                format!("/api/client/servers/{}/files/rename", id)
            }
            pub fn copy(id: &str) -> String {
                format!("/api/client/servers/{}/files/copy", id)
            }
            pub fn compress(id: &str) -> String {
                format!("/api/client/servers/{}/files/compress", id)
            }
            pub fn decompress(id: &str) -> String {
                format!("/api/client/servers/{}/files/decompress", id)
            }
            pub fn delete(id: &str) -> String {
                format!("/api/client/servers/{}/files/delete", id)
            }
            pub fn create_folder(id: &str) -> String {
                format!("/api/client/servers/{}/files/create-folder", id)
            }
            pub fn chmod(id: &str) -> String {
                format!("/api/client/servers/{}/files/chmod", id)
            }
            pub fn pull(id: &str) -> String {
                format!("/api/client/servers/{}/files/pull", id)
            }
            pub fn upload(id: &str) -> String {
                format!("/api/client/servers/{}/files/upload", id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_paths() {
        assert_eq!(application::users::external("ext-1"), "/api/application/users/external/ext-1");
        assert_eq!(application::allocations::get(3, 9), "/api/application/nodes/3/allocations/9");
        assert_eq!(application::servers::force(7), "/api/application/servers/7/force");
        assert_eq!(application::nests::eggs::get(1, 5), "/api/application/nests/1/eggs/5");
    }

    #[test]
    fn test_external_ids_are_encoded() {
        assert_eq!(
            application::users::external("team/a b"),
            "/api/application/users/external/team%2Fa%20b"
        );
        assert_eq!(
            application::servers::external("srv?1"),
            "/api/application/servers/external/srv%3F1"
        );
    }

    #[test]
    fn test_file_paths_encode_names() {
        assert_eq!(
            client::servers::files::contents("abcd1234", "logs/latest log.txt"),
            "/api/client/servers/abcd1234/files/contents?file=logs%2Flatest%20log.txt"
        );
        assert_eq!(
            client::servers::files::list("abcd1234", None),
            "/api/client/servers/abcd1234/files/list"
        );
    }
}
