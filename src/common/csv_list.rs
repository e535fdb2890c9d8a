// src/common/csv_list.rs
//
// Listas separadas por vírgula guardadas numa única coluna de texto
// (usadas pelo documento "Verificaciones de seguridad").
// Valores aparados, segmentos vazios descartados, sem escape de vírgulas.

pub const SEPARATOR: char = ',';

pub fn split(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(SEPARATOR)
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

pub fn join<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|item| item.as_ref().trim())
        .filter(|item| !item.is_empty())
        .collect::<Vec<_>>()
        .join(&SEPARATOR.to_string())
}

/// Acrescenta ao final da lista existente, preservando ordem e duplicados.
pub fn append(existing: Option<&str>, addition: &str) -> String {
    let mut items = split(existing);
    items.extend(split(Some(addition)));
    join(&items)
}

/// Prepara um item para entrar na lista sem quebrar o alinhamento por posição:
/// vírgulas no nome viram `;` e, nos links, `%2C` (equivalente na URL).
pub fn label_item(value: &str) -> String {
    value.trim().replace(SEPARATOR, ";")
}

pub fn link_item(value: &str) -> String {
    value.trim().replace(SEPARATOR, "%2C")
}

/// Emparelha rótulos e links por posição. Rótulo ausente vira "Archivo N" (base 1).
pub fn paired_entries(names: Option<&str>, links: Option<&str>) -> Vec<(String, String)> {
    let names = split(names);
    split(links)
        .into_iter()
        .enumerate()
        .map(|(i, link)| {
            let label = names
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("Archivo {}", i + 1));
            (label, link)
        })
        .collect()
}
