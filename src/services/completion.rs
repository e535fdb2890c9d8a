// src/services/completion.rs

use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    common::{csv_list, normalize::is_security_verification},
    models::{
        intake::{DocumentType, UploadedDocument},
        progress::{CompletionReport, DocumentStatus, FileEntry},
    },
};

/// Um documento está cumprido quando o link gravado tem conteúdo.
/// Para "Verificaciones de seguridad", basta um item não vazio na lista.
pub fn is_fulfilled(doc_type: &DocumentType, upload: Option<&UploadedDocument>) -> bool {
    let Some(upload) = upload else {
        return false;
    };
    if is_security_verification(&doc_type.name) {
        !csv_list::split(Some(&upload.drive_link)).is_empty()
    } else {
        !upload.drive_link.trim().is_empty()
    }
}

/// round(fulfilled / total * 100) com arredondamento half-up, em aritmética inteira.
pub fn completion_percent(fulfilled: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let fulfilled = fulfilled.min(total);
    ((fulfilled * 200 + total) / (total * 2)) as u8
}

fn files_for(doc_type: &DocumentType, upload: Option<&UploadedDocument>, multi: bool) -> Vec<FileEntry> {
    let Some(upload) = upload else {
        return Vec::new();
    };

    if multi {
        return csv_list::paired_entries(Some(&upload.file_name), Some(&upload.drive_link))
            .into_iter()
            .map(|(label, link)| FileEntry { label, link })
            .collect();
    }

    if !is_fulfilled(doc_type, Some(upload)) {
        return Vec::new();
    }
    let label = match upload.file_name.trim() {
        "" => "Archivo 1".to_string(),
        name => name.to_string(),
    };
    vec![FileEntry { label, link: upload.drive_link.trim().to_string() }]
}

pub fn compute_completion(
    documents: &[DocumentType],
    uploads: &HashMap<Uuid, UploadedDocument>,
) -> CompletionReport {
    let mut total_required = 0;
    let mut fulfilled_count = 0;

    let statuses: Vec<DocumentStatus> = documents
        .iter()
        .map(|doc| {
            let upload = uploads.get(&doc.id);
            let multi = is_security_verification(&doc.name);
            let fulfilled = is_fulfilled(doc, upload);

            if doc.is_required {
                total_required += 1;
                if fulfilled {
                    fulfilled_count += 1;
                }
            }

            DocumentStatus {
                document_type_id: doc.id,
                name: doc.name.clone(),
                is_required: doc.is_required,
                is_multi_file: multi,
                fulfilled,
                uploaded_at: upload.map(|u| u.uploaded_at),
                uploaded_by: upload.and_then(|u| u.uploaded_by.clone()),
                files: files_for(doc, upload, multi),
            }
        })
        .collect();

    CompletionReport {
        percent: completion_percent(fulfilled_count, total_required),
        fulfilled_count,
        total_required,
        documents: statuses,
    }
}
