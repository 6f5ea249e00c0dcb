//! Static catalog contents

use super::{ExtraFieldKind, ExtraFieldSpec, SubjectEntry};
use crate::models::Department;

pub static CATEGORIES: &[&str] = &[
    "Iluminação Pública",
    "Saúde",
    "Educação",
    "Segurança Pública",
    "Transporte Público",
    "Saneamento e Água",
    "Energia Elétrica",
    "Limpeza Urbana",
    "Infraestrutura e Obras",
    "Trânsito e Veículos",
    "Meio Ambiente",
    "Assistência Social",
    "Serviços Administrativos",
    "Outros",
];

const fn text(
    id: &'static str,
    label: &'static str,
    required: bool,
    placeholder: Option<&'static str>,
) -> ExtraFieldSpec {
    ExtraFieldSpec {
        id,
        label,
        kind: ExtraFieldKind::Text,
        required,
        placeholder,
        options: &[],
        max_length: None,
    }
}

const fn number(
    id: &'static str,
    label: &'static str,
    required: bool,
    placeholder: Option<&'static str>,
) -> ExtraFieldSpec {
    ExtraFieldSpec {
        id,
        label,
        kind: ExtraFieldKind::Number,
        required,
        placeholder,
        options: &[],
        max_length: None,
    }
}

const fn date(id: &'static str, label: &'static str, required: bool) -> ExtraFieldSpec {
    ExtraFieldSpec {
        id,
        label,
        kind: ExtraFieldKind::Date,
        required,
        placeholder: None,
        options: &[],
        max_length: None,
    }
}

const fn select(
    id: &'static str,
    label: &'static str,
    required: bool,
    options: &'static [&'static str],
) -> ExtraFieldSpec {
    ExtraFieldSpec {
        id,
        label,
        kind: ExtraFieldKind::Select,
        required,
        placeholder: None,
        options,
        max_length: None,
    }
}

const fn multiline(
    id: &'static str,
    label: &'static str,
    required: bool,
    placeholder: &'static str,
    max_length: usize,
) -> ExtraFieldSpec {
    ExtraFieldSpec {
        id,
        label,
        kind: ExtraFieldKind::MultilineText,
        required,
        placeholder: Some(placeholder),
        options: &[],
        max_length: Some(max_length),
    }
}

const SCHOOL_NAME: ExtraFieldSpec = text(
    "escola-nome",
    "Nome da escola",
    true,
    Some("Nome completo da escola"),
);

const BUS_LINE: ExtraFieldSpec = text("linha-onibus", "Número da linha", true, Some("Ex: 0.110"));

pub static SUBJECTS: &[SubjectEntry] = &[
    // Iluminação Pública
    SubjectEntry {
        id: "iluminacao-falta",
        name: "Falta de Iluminação Pública",
        category: "Iluminação Pública",
        department: Department::Ceb,
        requires_location: true,
        extra_fields: &[
            text(
                "protocolo-ceb",
                "Protocolo de 1ª instância gerado pela CEB (se houver)",
                false,
                Some("Ex: 2024123456789"),
            ),
            number(
                "quantidade-postes",
                "Quantidade de postes afetados",
                false,
                Some("Ex: 3"),
            ),
        ],
        keywords: &[
            "luz",
            "escuro",
            "iluminação",
            "poste apagado",
            "sem luz",
            "lâmpada queimada",
            "falta de luz",
            "poste",
        ],
    },
    SubjectEntry {
        id: "iluminacao-funcionamento",
        name: "Iluminação Pública (Funcionamento)",
        category: "Iluminação Pública",
        department: Department::Ceb,
        requires_location: true,
        extra_fields: &[select(
            "problema-tipo",
            "Tipo de problema",
            true,
            &[
                "Lâmpada queimada",
                "Lâmpada piscando",
                "Poste danificado",
                "Fiação exposta",
                "Outro",
            ],
        )],
        keywords: &["poste piscando", "luz fraca", "iluminação ruim"],
    },
    SubjectEntry {
        id: "iluminacao-instalacao",
        name: "Iluminação Pública (Instalação de poste)",
        category: "Iluminação Pública",
        department: Department::Ceb,
        requires_location: true,
        extra_fields: &[],
        keywords: &[],
    },
    SubjectEntry {
        id: "iluminacao-remanejamento",
        name: "Iluminação Pública (Remanejamento de poste)",
        category: "Iluminação Pública",
        department: Department::Ceb,
        requires_location: true,
        extra_fields: &[multiline(
            "motivo-remanejamento",
            "Motivo do remanejamento",
            true,
            "Descreva o motivo para remanejamento do poste",
            500,
        )],
        keywords: &[],
    },
    // Saúde
    SubjectEntry {
        id: "saude-atendimento-ubs",
        name: "Atendimento em UBS/Posto de Saúde",
        category: "Saúde",
        department: Department::Ses,
        requires_location: true,
        extra_fields: &[
            text(
                "unidade-saude",
                "Nome da unidade de saúde",
                true,
                Some("Ex: UBS 1 do Gama"),
            ),
            date("data-atendimento", "Data do atendimento", false),
        ],
        keywords: &[
            "ubs",
            "posto de saúde",
            "atendimento médico",
            "consulta",
            "médico",
            "saúde",
        ],
    },
    SubjectEntry {
        id: "saude-atendimento-hospital",
        name: "Atendimento em Hospital",
        category: "Saúde",
        department: Department::Ses,
        requires_location: true,
        extra_fields: &[
            text(
                "hospital-nome",
                "Nome do hospital",
                true,
                Some("Ex: Hospital de Base do DF"),
            ),
            text("setor-hospital", "Setor/Ala", false, Some("Ex: Pronto Socorro")),
        ],
        keywords: &["hospital", "emergência", "pronto socorro", "internação"],
    },
    SubjectEntry {
        id: "saude-falta-medicamento",
        name: "Falta de Medicamento",
        category: "Saúde",
        department: Department::Ses,
        requires_location: true,
        extra_fields: &[
            text(
                "medicamento-nome",
                "Nome do medicamento",
                true,
                Some("Nome comercial ou genérico"),
            ),
            text(
                "local-procurado",
                "Local onde procurou",
                false,
                Some("Nome da farmácia ou unidade"),
            ),
        ],
        keywords: &["medicamento", "remédio", "falta remédio", "farmácia"],
    },
    SubjectEntry {
        id: "saude-agendamento-consulta",
        name: "Agendamento de Consulta/Exame",
        category: "Saúde",
        department: Department::Ses,
        requires_location: true,
        extra_fields: &[
            text(
                "especialidade",
                "Especialidade médica",
                true,
                Some("Ex: Cardiologia, Ortopedia"),
            ),
            text(
                "tempo-espera",
                "Tempo de espera informado",
                false,
                Some("Ex: 6 meses"),
            ),
        ],
        keywords: &[],
    },
    SubjectEntry {
        id: "saude-dengue",
        name: "Dengue/Foco de Mosquito",
        category: "Saúde",
        department: Department::Ses,
        requires_location: true,
        extra_fields: &[select(
            "tipo-foco",
            "Tipo de foco",
            true,
            &[
                "Água parada",
                "Terreno baldio",
                "Entulho acumulado",
                "Piscina abandonada",
                "Caixa d'água destampada",
                "Outro",
            ],
        )],
        keywords: &["dengue", "mosquito", "aedes", "foco", "água parada"],
    },
    // Educação
    SubjectEntry {
        id: "educacao-matricula",
        name: "Matrícula Escolar",
        category: "Educação",
        department: Department::Seedf,
        requires_location: true,
        extra_fields: &[
            text(
                "serie-ano",
                "Série/Ano desejado",
                true,
                Some("Ex: 5º ano do Ensino Fundamental"),
            ),
            text(
                "escola-pretendida",
                "Escola pretendida",
                false,
                Some("Nome da escola"),
            ),
        ],
        keywords: &["matrícula", "escola", "vaga", "estudar"],
    },
    SubjectEntry {
        id: "educacao-infraestrutura",
        name: "Infraestrutura Escolar",
        category: "Educação",
        department: Department::Seedf,
        requires_location: true,
        extra_fields: &[
            SCHOOL_NAME,
            select(
                "problema-infra",
                "Tipo de problema",
                true,
                &[
                    "Telhado danificado",
                    "Banheiro sem condições",
                    "Falta de água",
                    "Falta de energia",
                    "Acessibilidade",
                    "Quadra/Pátio",
                    "Outro",
                ],
            ),
        ],
        keywords: &["escola", "estrutura", "telhado", "banheiro escola"],
    },
    SubjectEntry {
        id: "educacao-transporte-escolar",
        name: "Transporte Escolar",
        category: "Educação",
        department: Department::Seedf,
        requires_location: true,
        extra_fields: &[
            SCHOOL_NAME,
            text(
                "rota-atual",
                "Rota atual ou pretendida",
                false,
                Some("De onde para onde"),
            ),
        ],
        keywords: &[],
    },
    SubjectEntry {
        id: "educacao-merenda",
        name: "Merenda Escolar",
        category: "Educação",
        department: Department::Seedf,
        requires_location: true,
        extra_fields: &[SCHOOL_NAME],
        keywords: &[],
    },
    // Transporte Público
    SubjectEntry {
        id: "transporte-onibus-horario",
        name: "Ônibus - Horário/Frequência",
        category: "Transporte Público",
        department: Department::Semob,
        requires_location: true,
        extra_fields: &[
            BUS_LINE,
            text(
                "ponto-embarque",
                "Ponto de embarque",
                false,
                Some("Local do ponto"),
            ),
        ],
        keywords: &["ônibus", "horário", "demora", "linha", "transporte"],
    },
    SubjectEntry {
        id: "transporte-onibus-condicoes",
        name: "Ônibus - Condições do Veículo",
        category: "Transporte Público",
        department: Department::Semob,
        requires_location: true,
        extra_fields: &[
            BUS_LINE,
            text(
                "placa-veiculo",
                "Placa do veículo (se souber)",
                false,
                Some("Ex: ABC1234"),
            ),
            select(
                "problema-veiculo",
                "Tipo de problema",
                true,
                &[
                    "Ar condicionado",
                    "Bancos danificados",
                    "Sujeira",
                    "Acessibilidade",
                    "Superlotação",
                    "Outro",
                ],
            ),
        ],
        keywords: &["ônibus sujo", "ônibus quebrado", "ar condicionado"],
    },
    SubjectEntry {
        id: "transporte-metro",
        name: "Metrô-DF",
        category: "Transporte Público",
        department: Department::Semob,
        requires_location: true,
        extra_fields: &[text("estacao", "Estação", true, Some("Nome da estação"))],
        keywords: &["metrô", "estação", "metro-df"],
    },
    SubjectEntry {
        id: "transporte-passe-livre",
        name: "Passe Livre Estudantil",
        category: "Transporte Público",
        department: Department::Semob,
        requires_location: true,
        extra_fields: &[select(
            "situacao",
            "Situação",
            true,
            &[
                "Cartão não funciona",
                "Cadastro negado",
                "Renovação",
                "Primeira via",
                "Outro",
            ],
        )],
        keywords: &[],
    },
    // Saneamento e Água
    SubjectEntry {
        id: "agua-falta",
        name: "Falta de Água",
        category: "Saneamento e Água",
        department: Department::Caesb,
        requires_location: true,
        extra_fields: &[
            text(
                "duracao-falta",
                "Há quanto tempo está sem água",
                true,
                Some("Ex: 3 dias"),
            ),
            text(
                "protocolo-caesb",
                "Protocolo CAESB (se houver)",
                false,
                Some("Número do protocolo"),
            ),
        ],
        keywords: &["falta água", "sem água", "água", "caesb", "torneira seca"],
    },
    SubjectEntry {
        id: "agua-vazamento",
        name: "Vazamento de Água",
        category: "Saneamento e Água",
        department: Department::Caesb,
        requires_location: true,
        extra_fields: &[select(
            "tipo-vazamento",
            "Tipo de vazamento",
            true,
            &[
                "Na rua/calçada",
                "No hidrômetro",
                "Em tubulação aparente",
                "Outro",
            ],
        )],
        keywords: &["vazamento", "água vazando", "cano estourado"],
    },
    SubjectEntry {
        id: "esgoto-problema",
        name: "Problema com Esgoto",
        category: "Saneamento e Água",
        department: Department::Caesb,
        requires_location: true,
        extra_fields: &[select(
            "tipo-problema-esgoto",
            "Tipo de problema",
            true,
            &[
                "Esgoto a céu aberto",
                "Bueiro entupido",
                "Mau cheiro",
                "Transbordamento",
                "Outro",
            ],
        )],
        keywords: &["esgoto", "bueiro", "mau cheiro", "esgoto aberto"],
    },
    // Limpeza Urbana
    SubjectEntry {
        id: "lixo-coleta",
        name: "Coleta de Lixo",
        category: "Limpeza Urbana",
        department: Department::Slu,
        requires_location: true,
        extra_fields: &[number(
            "dias-sem-coleta",
            "Dias sem coleta",
            true,
            Some("Quantidade de dias"),
        )],
        keywords: &["lixo", "coleta", "lixo acumulado", "gari"],
    },
    SubjectEntry {
        id: "lixo-entulho",
        name: "Descarte Irregular de Entulho",
        category: "Limpeza Urbana",
        department: Department::Slu,
        requires_location: true,
        extra_fields: &[],
        keywords: &["entulho", "descarte irregular", "lixão"],
    },
    SubjectEntry {
        id: "lixo-container",
        name: "Container/Lixeira Pública",
        category: "Limpeza Urbana",
        department: Department::Slu,
        requires_location: true,
        extra_fields: &[select(
            "problema-container",
            "Tipo de problema",
            true,
            &[
                "Falta de container",
                "Container quebrado",
                "Container cheio",
                "Outro",
            ],
        )],
        keywords: &[],
    },
    // Infraestrutura e Obras
    SubjectEntry {
        id: "buraco-via",
        name: "Buraco na Via/Calçada",
        category: "Infraestrutura e Obras",
        department: Department::Novacap,
        requires_location: true,
        extra_fields: &[
            select(
                "tamanho-buraco",
                "Tamanho aproximado",
                true,
                &[
                    "Pequeno (até 30cm)",
                    "Médio (30cm a 1m)",
                    "Grande (mais de 1m)",
                ],
            ),
            select(
                "profundidade",
                "Profundidade aproximada",
                false,
                &[
                    "Raso (até 10cm)",
                    "Médio (10 a 30cm)",
                    "Fundo (mais de 30cm)",
                ],
            ),
        ],
        keywords: &["buraco", "asfalto", "cratera", "via danificada"],
    },
    SubjectEntry {
        id: "calcada-problema",
        name: "Problema em Calçada",
        category: "Infraestrutura e Obras",
        department: Department::Novacap,
        requires_location: true,
        extra_fields: &[],
        keywords: &["calçada", "calçada quebrada", "piso danificado"],
    },
    SubjectEntry {
        id: "arvore-poda",
        name: "Poda de Árvore",
        category: "Infraestrutura e Obras",
        department: Department::Novacap,
        requires_location: true,
        extra_fields: &[select(
            "motivo-poda",
            "Motivo da poda",
            true,
            &[
                "Risco de queda",
                "Bloqueando iluminação",
                "Bloqueando visão de trânsito",
                "Raízes danificando calçada",
                "Galhos na fiação",
                "Outro",
            ],
        )],
        keywords: &["árvore", "poda", "galho", "árvore caindo"],
    },
    SubjectEntry {
        id: "praca-parque",
        name: "Manutenção de Praça/Parque",
        category: "Infraestrutura e Obras",
        department: Department::Novacap,
        requires_location: true,
        extra_fields: &[select(
            "problema-praca",
            "Tipo de problema",
            true,
            &[
                "Mato alto",
                "Equipamentos quebrados",
                "Falta de iluminação",
                "Lixo/Sujeira",
                "Bancos danificados",
                "Outro",
            ],
        )],
        keywords: &[],
    },
    // Trânsito e Veículos
    SubjectEntry {
        id: "semaforo-problema",
        name: "Semáforo com Problema",
        category: "Trânsito e Veículos",
        department: Department::Detran,
        requires_location: true,
        extra_fields: &[select(
            "problema-semaforo",
            "Tipo de problema",
            true,
            &[
                "Não funciona",
                "Tempo inadequado",
                "Lâmpada queimada",
                "Sem sincronismo",
                "Outro",
            ],
        )],
        keywords: &["semáforo", "sinal", "farol"],
    },
    SubjectEntry {
        id: "sinalizacao-falta",
        name: "Falta de Sinalização",
        category: "Trânsito e Veículos",
        department: Department::Detran,
        requires_location: true,
        extra_fields: &[select(
            "tipo-sinalizacao",
            "Tipo de sinalização necessária",
            true,
            &[
                "Placa de pare",
                "Faixa de pedestre",
                "Lombada",
                "Placa de velocidade",
                "Outro",
            ],
        )],
        keywords: &["sinalização", "placa", "faixa de pedestre"],
    },
    SubjectEntry {
        id: "detran-documento",
        name: "Documentação de Veículo",
        category: "Trânsito e Veículos",
        department: Department::Detran,
        requires_location: true,
        extra_fields: &[select(
            "tipo-documento",
            "Tipo de documento",
            true,
            &[
                "CRLV",
                "Transferência",
                "Primeiro emplacamento",
                "Baixa de veículo",
                "Outro",
            ],
        )],
        keywords: &[],
    },
    SubjectEntry {
        id: "cnh-habilitacao",
        name: "CNH/Habilitação",
        category: "Trânsito e Veículos",
        department: Department::Detran,
        requires_location: true,
        extra_fields: &[select(
            "tipo-servico-cnh",
            "Tipo de serviço",
            true,
            &[
                "Primeira habilitação",
                "Renovação",
                "Segunda via",
                "Mudança de categoria",
                "Outro",
            ],
        )],
        keywords: &[],
    },
    // Segurança Pública
    SubjectEntry {
        id: "policiamento-falta",
        name: "Falta de Policiamento",
        category: "Segurança Pública",
        department: Department::Ssp,
        requires_location: true,
        extra_fields: &[],
        keywords: &["polícia", "policiamento", "segurança", "roubo", "assalto"],
    },
    SubjectEntry {
        id: "seguranca-local-risco",
        name: "Local de Risco",
        category: "Segurança Pública",
        department: Department::Ssp,
        requires_location: true,
        extra_fields: &[select(
            "tipo-risco",
            "Tipo de risco",
            true,
            &[
                "Assaltos frequentes",
                "Tráfico de drogas",
                "Ponto de uso de drogas",
                "Vandalismo",
                "Outro",
            ],
        )],
        keywords: &[],
    },
    // Meio Ambiente
    SubjectEntry {
        id: "meio-ambiente-queimada",
        name: "Queimada",
        category: "Meio Ambiente",
        department: Department::Sema,
        requires_location: true,
        extra_fields: &[],
        keywords: &["queimada", "fogo", "incêndio", "fumaça"],
    },
    SubjectEntry {
        id: "meio-ambiente-poluicao",
        name: "Poluição",
        category: "Meio Ambiente",
        department: Department::Sema,
        requires_location: true,
        extra_fields: &[select(
            "tipo-poluicao",
            "Tipo de poluição",
            true,
            &["Sonora", "Do ar", "Da água", "Visual", "Outro"],
        )],
        keywords: &[],
    },
    // Serviços Administrativos
    SubjectEntry {
        id: "servicos-certidao",
        name: "Solicitação de Certidão/Documento",
        category: "Serviços Administrativos",
        department: Department::Seec,
        requires_location: false,
        extra_fields: &[],
        keywords: &["certidão", "declaração", "segunda via de documento"],
    },
    // Outros
    SubjectEntry {
        id: "outros-geral",
        name: "Outro Assunto",
        category: "Outros",
        department: Department::Other,
        requires_location: true,
        extra_fields: &[multiline(
            "descricao-complementar",
            "Informações complementares",
            false,
            "Descreva informações adicionais que possam ajudar",
            1000,
        )],
        keywords: &[],
    },
];
