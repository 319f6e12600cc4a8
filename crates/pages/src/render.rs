//! Minimal HTML rendering for the server-rendered pages.
//!
//! Template design is out of scope; these builders emit small utilitarian
//! pages with the data and forms the flows need. All interpolated user data
//! goes through `escape`.

use crate::form::{ConsultaForm, ReceitaForm};
use prontuario_core::{Catalogs, ConsMedicamento, Consulta, FieldErrors, Medico};
use std::fmt::Write;

/// HTML-escape text content and attribute values.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Common page frame. Every page names the acting medico.
pub fn layout(title: &str, medico: &Medico, body: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"pt-BR\">\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body>\n<header><h1>{title}</h1><p>{medico}</p></header>\n{body}\n</body>\n</html>\n",
        title = escape(title),
        medico = escape(&medico.nome),
    )
}

pub fn notice_banner(message: &str) -> String {
    format!("<p class=\"notice\">{}</p>\n", escape(message))
}

fn field_messages(field: &str, errors: &FieldErrors) -> String {
    let Some(messages) = errors.get(field) else {
        return String::new();
    };
    let mut out = String::from("<ul class=\"errors\">");
    for message in messages {
        let _ = write!(out, "<li>{}</li>", escape(message));
    }
    out.push_str("</ul>");
    out
}

fn paciente_select(selected: &str, catalogs: &Catalogs) -> String {
    let mut out = String::from("<select name=\"paciente\"><option value=\"\">--</option>");
    for paciente in catalogs.pacientes() {
        let value = paciente.id.to_string();
        let _ = write!(
            out,
            "<option value=\"{value}\"{sel}>{nome}</option>",
            sel = if value == selected { " selected" } else { "" },
            nome = escape(&paciente.nome),
        );
    }
    out.push_str("</select>");
    out
}

fn medicamento_select(selected: &str, catalogs: &Catalogs) -> String {
    let mut out = String::from("<select name=\"medicamento\"><option value=\"\">--</option>");
    for medicamento in catalogs.medicamentos() {
        let value = medicamento.id.to_string();
        let _ = write!(
            out,
            "<option value=\"{value}\"{sel}>{nome}</option>",
            sel = if value == selected { " selected" } else { "" },
            nome = escape(&medicamento.nome),
        );
    }
    out.push_str("</select>");
    out
}

/// The consultation form, used by the list (blank), add and edit pages.
pub fn consulta_form(
    action: &str,
    form: &ConsultaForm,
    errors: &FieldErrors,
    catalogs: &Catalogs,
) -> String {
    format!(
        "<form method=\"post\" action=\"{action}\">\n\
         <label>Paciente {select}</label>{paciente_errors}\n\
         <label>CIDs <input name=\"cids\" value=\"{cids}\"></label>{cids_errors}\n\
         <label>Medicamentos <input name=\"medicamentos\" value=\"{medicamentos}\"></label>{medicamentos_errors}\n\
         <label>Observações <textarea name=\"observacoes\">{observacoes}</textarea></label>{observacoes_errors}\n\
         <button type=\"submit\">Salvar</button>\n</form>\n",
        action = escape(action),
        select = paciente_select(form.paciente.trim(), catalogs),
        paciente_errors = field_messages("paciente", errors),
        cids = escape(&form.cids),
        cids_errors = field_messages("cids", errors),
        medicamentos = escape(&form.medicamentos),
        medicamentos_errors = field_messages("medicamentos", errors),
        observacoes = escape(&form.observacoes),
        observacoes_errors = field_messages("observacoes", errors),
    )
}

/// The prescription-line form used by the edit-receita page.
pub fn receita_form(
    action: &str,
    form: &ReceitaForm,
    errors: &FieldErrors,
    catalogs: &Catalogs,
) -> String {
    format!(
        "<form method=\"post\" action=\"{action}\">\n\
         <label>Medicamento {select}</label>{medicamento_errors}\n\
         <label>Dosagem <input name=\"dosagem\" value=\"{dosagem}\"></label>{dosagem_errors}\n\
         <label>Instruções <textarea name=\"instrucoes\">{instrucoes}</textarea></label>{instrucoes_errors}\n\
         <button type=\"submit\">Salvar</button>\n</form>\n",
        action = escape(action),
        select = medicamento_select(form.medicamento.trim(), catalogs),
        medicamento_errors = field_messages("medicamento", errors),
        dosagem = escape(&form.dosagem),
        dosagem_errors = field_messages("dosagem", errors),
        instrucoes = escape(&form.instrucoes),
        instrucoes_errors = field_messages("instrucoes", errors),
    )
}

fn paciente_name(id: u64, catalogs: &Catalogs) -> String {
    catalogs
        .paciente(id)
        .map(|p| escape(&p.nome))
        .unwrap_or_else(|| format!("#{id}"))
}

/// Table of all consultations, as shown on the list page.
pub fn consultas_table(consultas: &[Consulta], catalogs: &Catalogs) -> String {
    let mut out = String::from(
        "<table>\n<tr><th>Id</th><th>Paciente</th><th>CIDs</th><th>Medicamentos</th><th></th></tr>\n",
    );
    for consulta in consultas {
        let _ = write!(
            out,
            "<tr><td>{id}</td><td>{paciente}</td><td>{cids}</td><td>{medicamentos}</td>\
             <td><a href=\"/consultas/{id}/detail/\">detalhe</a> \
             <a href=\"/consultas/{id}/edit/\">editar</a> \
             <form method=\"post\" action=\"/consultas/{id}/remove/\"><button type=\"submit\">remover</button></form></td></tr>\n",
            id = consulta.id,
            paciente = paciente_name(consulta.paciente_id, catalogs),
            cids = consulta.cids.len(),
            medicamentos = consulta.medicamentos.len(),
        );
    }
    out.push_str("</table>\n");
    out
}

/// Read-only detail view: consultation fields, resolved diagnoses and
/// medications, and the prescription lines of this consultation.
pub fn consulta_detail(
    consulta: &Consulta,
    receitas: &[ConsMedicamento],
    catalogs: &Catalogs,
) -> String {
    let mut out = format!(
        "<section>\n<p>Paciente: {paciente}</p>\n<p>Observações: {observacoes}</p>\n",
        paciente = paciente_name(consulta.paciente_id, catalogs),
        observacoes = escape(&consulta.observacoes),
    );

    out.push_str("<h2>CIDs</h2>\n<ul class=\"cids\">\n");
    for id in &consulta.cids {
        match catalogs.cid(*id) {
            Some(cid) => {
                let _ = write!(
                    out,
                    "<li>{} - {}</li>\n",
                    escape(&cid.codigo),
                    escape(&cid.descricao)
                );
            }
            None => {
                let _ = write!(out, "<li>#{id}</li>\n");
            }
        }
    }
    out.push_str("</ul>\n<h2>Medicamentos</h2>\n<ul class=\"medicamentos\">\n");
    for id in &consulta.medicamentos {
        match catalogs.medicamento(*id) {
            Some(medicamento) => {
                let _ = write!(
                    out,
                    "<li>{} {}</li>\n",
                    escape(&medicamento.nome),
                    escape(&medicamento.apresentacao)
                );
            }
            None => {
                let _ = write!(out, "<li>#{id}</li>\n");
            }
        }
    }

    out.push_str("</ul>\n<h2>Receitas</h2>\n<table class=\"receitas\">\n");
    for receita in receitas {
        let medicamento = catalogs
            .medicamento(receita.medicamento_id)
            .map(|m| escape(&m.nome))
            .unwrap_or_else(|| format!("#{}", receita.medicamento_id));
        let _ = write!(
            out,
            "<tr><td>{medicamento}</td><td>{dosagem}</td><td>{instrucoes}</td>\
             <td><a href=\"/consultas/receita/{id}/edit/\">editar</a></td></tr>\n",
            dosagem = escape(&receita.dosagem),
            instrucoes = escape(&receita.instrucoes),
            id = receita.id,
        );
    }
    out.push_str("</table>\n</section>\n");
    out
}
