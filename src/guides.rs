use crate::models::{EmergencyInstruction, GuideCategory};

/// Built-in first-aid catalog seeded on first run. Content is product copy
/// (pt-BR); only the icon field is ever edited by the user.
pub fn default_guides() -> Vec<EmergencyInstruction> {
    let seed: [(&str, &str, &str, GuideCategory, &str); 14] = [
        (
            "1",
            "Falta de Ar",
            "Wind",
            GuideCategory::Saude,
            "1. Sente-se e tente manter a calma.\n2. Incline o corpo levemente para frente.\n3. Respire devagar pelo nariz.\n4. Se não melhorar em 2 minutos, ligue 192.",
        ),
        (
            "2",
            "Convulsão",
            "Zap",
            GuideCategory::Saude,
            "1. Afaste objetos próximos para evitar ferimentos.\n2. Coloque algo macio sob a cabeça.\n3. NÃO coloque nada na boca.\n4. Deite a pessoa de lado após a crise.\n5. Chame 192.",
        ),
        (
            "3",
            "Engasgo (Choking)",
            "🩹",
            GuideCategory::Saude,
            "1. Se a pessoa tosse, incentive-a a tossir com força.\n2. Se não consegue respirar ou falar, posicione-se atrás dela.\n3. Realize a Manobra de Heimlich: abrace a cintura e pressione o abdome para cima e para dentro com força.\n4. Se a pessoa desmaiar, ligue 192 imediatamente.",
        ),
        (
            "4",
            "Queimaduras",
            "🔥",
            GuideCategory::Saude,
            "1. Resfrie a área com água corrente fria por 15 minutos.\n2. NÃO use gelo, pasta de dente ou pomadas.\n3. Cubra levemente com um pano limpo e úmido.\n4. Se houver bolhas ou a pele estiver solta, procure o hospital.",
        ),
        (
            "5",
            "Cortes e Sangramento",
            "🩸",
            GuideCategory::Saude,
            "1. Lave a ferida com água corrente e sabão.\n2. Pressione o local com um pano limpo por 5-10 minutos sem parar.\n3. Se o sangue não parar, mantenha a pressão e eleve a região.\n4. Procure um posto de saúde para pontos se o corte for fundo.",
        ),
        (
            "6",
            "Hemorragia Grave",
            "🆘",
            GuideCategory::Saude,
            "1. Ligue 192 imediatamente.\n2. Pressione a ferida com toda a força usando um pano limpo.\n3. Se o pano encharcar, coloque outro por cima sem remover o primeiro.\n4. Se possível, eleve o membro ferido acima do nível do coração.",
        ),
        (
            "7",
            "Desmaio (Fainting)",
            "😵",
            GuideCategory::Saude,
            "1. Deite a pessoa de costas em local ventilado.\n2. Eleve as pernas dela (cerca de 30cm) acima do nível do coração.\n3. Afrouxe roupas apertadas.\n4. Se não acordar em 1 minuto ou se for idoso, ligue 192.",
        ),
        (
            "8",
            "AVC (Derrame)",
            "🧠",
            GuideCategory::Saude,
            "1. SORRISO: Peça para sorrir. A boca entortou?\n2. ABRAÇO: Peça para levantar os braços. Um caiu?\n3. FALA: Peça para repetir uma frase. A fala está enrolada?\n4. Se notar qualquer sinal, ligue 192 IMEDIATAMENTE.",
        ),
        (
            "9",
            "Dor no Peito (Infarto)",
            "💔",
            GuideCategory::Saude,
            "1. Ligue 192 imediatamente.\n2. Mantenha a pessoa sentada e em repouso absoluto.\n3. Afrouxe as roupas e tente acalmá-la.\n4. Não ofereça alimentos ou bebidas enquanto espera o SAMU.",
        ),
        (
            "10",
            "Crise de Ansiedade",
            "Brain",
            GuideCategory::Mental,
            "1. Encontre um lugar calmo e seguro.\n2. Inspire pelo nariz contando até 4.\n3. Segure o ar por 4 segundos.\n4. Solte lentamente pela boca contando até 4.\n5. Foque em 3 objetos que você consegue ver agora.",
        ),
        (
            "11",
            "Queda / Mobilidade",
            "Accessibility",
            GuideCategory::Mobilidade,
            "1. Não tente levantar a pessoa bruscamente.\n2. Pergunte onde dói e verifique se há deformidade em ossos.\n3. Se houver dor forte na coluna ou quadril, NÃO movimente.\n4. Agasalhe a pessoa e ligue para um familiar ou 192.",
        ),
        (
            "12",
            "Animais Peçonhentos",
            "🦂",
            GuideCategory::Saude,
            "1. Lave o local da picada apenas com água e sabão.\n2. Mantenha a vítima em repouso e o membro afetado elevado.\n3. NÃO faça torniquete, cortes ou sucção no local.\n4. Se possível, tire uma foto do animal para identificação médica.\n5. Leve a vítima ao hospital mais próximo imediatamente ou ligue 192.",
        ),
        (
            "13",
            "Recém-nascido",
            "👶",
            GuideCategory::Saude,
            "1. Engasgo: Coloque o bebê de bruços sobre seu braço, inclinado para baixo. Dê 5 tapinhas firmes nas costas.\n2. Vire o bebê e faça 5 compressões no peito com dois dedos.\n3. Respiração: Se o bebê não chora ou está roxo, ligue 192 imediatamente.\n4. Febre: Mantenha o bebê hidratado e procure auxílio médico urgente.",
        ),
        (
            "14",
            "Parada Cardíaca",
            "❤️",
            GuideCategory::Saude,
            "1. Ligue 192 (SAMU) ou 193 (Bombeiros) imediatamente.\n2. Verifique se a pessoa responde. Se não, deite-a de costas em superfície dura.\n3. Coloque as mãos no centro do peito da vítima.\n4. Com os braços esticados, empurre o peito com força e rapidez (100 a 120 vezes por minuto).\n5. Deixe o peito voltar à posição normal entre cada compressão.\n6. Continue até o socorro chegar ou a pessoa reagir.",
        ),
    ];

    seed.into_iter()
        .map(|(id, title, icon, category, content)| EmergencyInstruction {
            id: id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            icon: icon.to_string(),
            category,
        })
        .collect()
}

/// Read-mostly catalog of first-aid instructions. Entries are never created
/// or destroyed by the user; only icons change.
#[derive(Debug)]
pub struct GuideCatalog {
    guides: Vec<EmergencyInstruction>,
}

impl GuideCatalog {
    pub fn from_records(guides: Vec<EmergencyInstruction>) -> Self {
        Self { guides }
    }

    pub fn records(&self) -> &[EmergencyInstruction] {
        &self.guides
    }

    /// Case-insensitive substring match over title and category, preserving
    /// catalog order.
    pub fn filter(&self, query: &str) -> Vec<EmergencyInstruction> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.guides.clone();
        }
        self.guides
            .iter()
            .filter(|guide| {
                guide.title.to_lowercase().contains(&needle)
                    || guide.category.as_str().contains(&needle)
            })
            .cloned()
            .collect()
    }

    /// Replaces the icon of exactly one entry. The icon is free-form (a
    /// symbolic name or a literal glyph); rendering decides what it means.
    pub fn update_icon(&mut self, id: &str, new_icon: &str) -> bool {
        match self.guides.iter_mut().find(|guide| guide.id == id) {
            Some(guide) => {
                guide.icon = new_icon.to_string();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{default_guides, GuideCatalog};
    use std::collections::HashSet;

    #[test]
    fn seed_catalog_has_unique_ids() {
        let guides = default_guides();
        assert_eq!(guides.len(), 14);
        let ids: HashSet<_> = guides.iter().map(|guide| guide.id.clone()).collect();
        assert_eq!(ids.len(), guides.len());
    }

    #[test]
    fn filter_matches_title_case_insensitively() {
        let catalog = GuideCatalog::from_records(default_guides());
        let hits = catalog.filter("falta DE ar");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Falta de Ar");
    }

    #[test]
    fn filter_matches_category_and_preserves_order() {
        let catalog = GuideCatalog::from_records(default_guides());
        let hits = catalog.filter("saude");
        let all_saude: Vec<_> = catalog
            .records()
            .iter()
            .filter(|guide| guide.category.as_str() == "saude")
            .cloned()
            .collect();
        assert_eq!(hits, all_saude);
    }

    #[test]
    fn empty_query_returns_whole_catalog() {
        let catalog = GuideCatalog::from_records(default_guides());
        assert_eq!(catalog.filter("  "), catalog.records());
    }

    #[test]
    fn update_icon_touches_only_the_icon() {
        let mut catalog = GuideCatalog::from_records(default_guides());
        let before = catalog.records()[0].clone();
        assert!(catalog.update_icon(&before.id, "🫁"));
        let after = &catalog.records()[0];
        assert_eq!(after.icon, "🫁");
        assert_eq!(after.title, before.title);
        assert_eq!(after.content, before.content);
    }

    #[test]
    fn update_icon_on_unknown_id_is_a_noop() {
        let mut catalog = GuideCatalog::from_records(default_guides());
        assert!(!catalog.update_icon("missing", "🫁"));
    }
}
