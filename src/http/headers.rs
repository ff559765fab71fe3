//! # Headers HTTP
//! src/http/headers.rs
//!
//! Mapa de headers que conserva el orden de inserción (para serializar las
//! respuestas tal cual se construyeron) y aplica la política "el último gana"
//! cuando un nombre se repite. Los nombres se comparan sin distinguir
//! mayúsculas de minúsculas; el valor repetido reemplaza al anterior en su
//! posición original.

/// Colección ordenada de headers `Nombre: Valor`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Crea un mapa vacío
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserta un header. Si el nombre ya existía, se sobrescribe el valor
    ///
    /// # Ejemplo
    /// ```
    /// use http_core::http::Headers;
    ///
    /// let mut headers = Headers::new();
    /// headers.insert("Accept", "*/*");
    /// headers.insert("accept", "text/plain");
    ///
    /// assert_eq!(headers.len(), 1);
    /// assert_eq!(headers.get("Accept"), Some("text/plain"));
    /// ```
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        match self.position(&name) {
            Some(idx) => self.entries[idx].1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Obtiene el valor de un header
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|idx| self.entries[idx].1.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Itera en orden de inserción
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_preserved() {
        let mut headers = Headers::new();
        headers.insert("Content-Type", "text/plain");
        headers.insert("Content-Encoding", "gzip");
        headers.insert("Content-Length", "5");

        let names: Vec<&str> = headers.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Content-Type", "Content-Encoding", "Content-Length"]);
    }

    #[test]
    fn test_duplicate_overwrites_in_place() {
        let mut headers = Headers::new();
        headers.insert("Host", "a.com");
        headers.insert("Accept", "*/*");
        headers.insert("Host", "b.com");

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("Host"), Some("b.com"));
        assert_eq!(headers.iter().next(), Some(("Host", "b.com")));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut headers = Headers::new();
        headers.insert("User-Agent", "curl/8.9.1");

        assert_eq!(headers.get("user-agent"), Some("curl/8.9.1"));
        assert!(headers.contains("USER-AGENT"));
        assert!(!headers.contains("Accept"));
    }
}
